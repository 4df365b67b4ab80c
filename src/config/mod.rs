/// Database configuration and connection management
pub mod database;

/// Application settings and seed data loaded from config.toml
pub mod settings;
