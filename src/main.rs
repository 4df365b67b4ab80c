use stock_buddy::{
    api::{self, AppState},
    config::{database, settings},
    core::category,
    errors::Result,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal: env vars can be set externally
    dotenv().ok();

    // 3. Load settings (defaults when config.toml is absent)
    let settings = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed configured categories
    category::seed_categories(&db, &settings.categories)
        .await
        .inspect(|created| info!("Seeded {} new categories.", created))
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;

    // 6. Serve until Ctrl-C
    let listener = tokio::net::TcpListener::bind(&settings.bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", settings.bind_address, e))?;
    info!("Listening on {}", listener.local_addr()?);

    let app = api::router(AppState::new(db, Arc::new(settings)));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
