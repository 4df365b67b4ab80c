//! Application settings loaded from config.toml
//!
//! Every field has a default, so a partial file (or no file at all) is valid. The
//! `[[categories]]` list is seeded into the database at startup.

use crate::core::ledger::StockEditPolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// How edits and deletes of purchases/sales touch stock
    pub stock_edit_policy: StockEditPolicy,
    /// Page size used when a list request does not ask for one
    pub default_page_size: u64,
    /// Upper bound on a requested page size
    pub max_page_size: u64,
    /// HMAC secret for signing tokens; `JWT_SECRET` overrides it
    pub jwt_secret: String,
    /// Lifetime of access tokens
    pub access_token_minutes: i64,
    /// Lifetime of refresh tokens
    pub refresh_token_days: i64,
    /// Categories to create on startup
    pub categories: Vec<CategorySeed>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            stock_edit_policy: StockEditPolicy::default(),
            default_page_size: 20,
            max_page_size: 100,
            jwt_secret: String::new(),
            access_token_minutes: 5,
            refresh_token_days: 1,
            categories: Vec::new(),
        }
    }
}

/// A category to seed
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    /// Unique category name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text
pub fn parse_config(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.default_page_size == 0 || settings.max_page_size == 0 {
        return Err(Error::Config {
            message: "Page sizes must be greater than zero".to_string(),
        });
    }
    if settings.access_token_minutes <= 0
        || settings.refresh_token_days <= 0
        || chrono::Duration::try_minutes(settings.access_token_minutes).is_none()
        || chrono::Duration::try_days(settings.refresh_token_days).is_none()
    {
        return Err(Error::Config {
            message: "Token lifetimes must be positive and in range".to_string(),
        });
    }

    Ok(settings)
}

/// Loads settings from `CONFIG_PATH` (default `./config.toml`), falling back to defaults
/// when the file does not exist, then applies `JWT_SECRET`.
///
/// # Errors
/// Besides file errors, fails when no token secret is configured anywhere.
pub fn load_default_config() -> Result<Settings> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut settings = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        info!("No config file at {}, using default settings", path);
        Settings::default()
    };

    if let Ok(secret) = std::env::var("JWT_SECRET") {
        settings.jwt_secret = secret;
    }
    if settings.jwt_secret.is_empty() {
        return Err(Error::Config {
            message: "Set JWT_SECRET or jwt_secret in config.toml".to_string(),
        });
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            bind_address = "0.0.0.0:9000"
            stock_edit_policy = "reapply_full"
            default_page_size = 10
            max_page_size = 50
            jwt_secret = "change-me"
            access_token_minutes = 15
            refresh_token_days = 7

            [[categories]]
            name = "Electronics"
            description = "Gadgets"

            [[categories]]
            name = "Books"
        "#;

        let settings = parse_config(toml_str).unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:9000");
        assert_eq!(settings.stock_edit_policy, StockEditPolicy::ReapplyFull);
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.max_page_size, 50);
        assert_eq!(settings.jwt_secret, "change-me");
        assert_eq!(settings.access_token_minutes, 15);
        assert_eq!(settings.refresh_token_days, 7);
        assert_eq!(settings.categories.len(), 2);
        assert_eq!(settings.categories[0].description.as_deref(), Some("Gadgets"));
        assert!(settings.categories[1].description.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = parse_config("").unwrap();
        assert_eq!(settings.bind_address, "127.0.0.1:8000");
        assert_eq!(settings.stock_edit_policy, StockEditPolicy::Delta);
        assert_eq!(settings.default_page_size, 20);
        assert_eq!(settings.access_token_minutes, 5);
        assert_eq!(settings.refresh_token_days, 1);
        assert!(settings.jwt_secret.is_empty());
        assert!(settings.categories.is_empty());
    }

    #[test]
    fn test_rejects_zero_token_lifetime() {
        let result = parse_config("access_token_minutes = 0");
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = parse_config(r#"stock_edit_policy = "sometimes""#);
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let result = parse_config("default_page_size = 0");
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }
}
