//! Core business logic - framework-agnostic ledger and CRUD operations.
//!
//! Every operation on owned data takes the acting account explicitly; rows belonging to
//! another account behave exactly like rows that do not exist.

pub mod account;
pub mod category;
pub mod customer;
pub mod ledger;
pub mod product;
pub mod purchase;
pub mod query;
pub mod sale;
pub mod stock;
pub mod supplier;

use crate::errors::{Error, Result};

/// Identity of the account performing an operation.
pub type AccountId = i64;

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Minimal shape check for email addresses: `local@domain` with a dot in the domain.
pub(crate) fn require_email(field: &str, value: &str) -> Result<String> {
    let email = require_text(field, value)?;
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        });
    if !valid || email.contains(char::is_whitespace) {
        return Err(Error::validation(format!("{field} is not a valid email address")));
    }
    Ok(email)
}

/// Trims optional text, turning blank strings into `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  Laptop ").unwrap(), "Laptop");
        assert!(matches!(
            require_text("name", "   ").unwrap_err(),
            Error::Validation { message: _ }
        ));
    }

    #[test]
    fn test_require_email() {
        assert_eq!(require_email("email", "a@b.bg").unwrap(), "a@b.bg");
        assert!(require_email("email", "no-at-sign").is_err());
        assert!(require_email("email", "@b.bg").is_err());
        assert!(require_email("email", "a@localhost").is_err());
        assert!(require_email("email", "a b@c.de").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(None), None);
    }
}
