//! Unified error type for `StockBuddy`.
//!
//! Every fallible operation in the crate returns [`Result`]. Database errors convert
//! automatically, with unique-constraint violations surfaced as [`Error::Conflict`] so the
//! API layer can report them as client errors instead of internal failures.

use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// All errors produced by the ledger, the CRUD services and the configuration layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[source] DbErr),

    /// A unique field collided with an existing row
    #[error("Conflict: {message}")]
    Conflict {
        /// Which constraint was violated
        message: String,
    },

    /// Malformed or missing input
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A transaction quantity that is zero or negative
    #[error("Invalid quantity: {quantity} (must be greater than zero)")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// A negative price
    #[error("Invalid price: {price} (must not be negative)")]
    InvalidPrice {
        /// The rejected price
        price: Decimal,
    },

    /// A sale or stock adjustment that would drive stock below zero
    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        /// Product being adjusted
        product_id: i64,
        /// Stock on hand when the check ran
        available: i32,
        /// Units that would have been removed
        requested: i32,
    },

    /// Account lookups by id
    #[error("Account not found: {id}")]
    AccountNotFound {
        /// Account id
        id: i64,
    },

    /// Category lookups by id or name
    #[error("Category not found: {name}")]
    CategoryNotFound {
        /// Category id or name
        name: String,
    },

    /// Product missing or owned by another account
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Product id
        id: i64,
    },

    /// Customer missing or owned by another account
    #[error("Customer not found: {id}")]
    CustomerNotFound {
        /// Customer id
        id: i64,
    },

    /// Supplier missing or owned by another account
    #[error("Supplier not found: {id}")]
    SupplierNotFound {
        /// Supplier id
        id: i64,
    },

    /// Purchase missing or owned by another account
    #[error("Purchase not found: {id}")]
    PurchaseNotFound {
        /// Purchase id
        id: i64,
    },

    /// Sale missing or owned by another account
    #[error("Sale not found: {id}")]
    SaleNotFound {
        /// Sale id
        id: i64,
    },

    /// Missing, expired or forged token, or credentials that do not match an account
    #[error("Unauthorized")]
    Unauthorized,

    /// Password hashing or token signing failed
    #[error("Authentication error: {message}")]
    Auth {
        /// What went wrong
        message: String,
    },

    /// I/O failure (binding the listener, reading files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a [`Error::Validation`] from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for every "row does not exist for this account" variant.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound { .. }
                | Self::CategoryNotFound { .. }
                | Self::ProductNotFound { .. }
                | Self::CustomerNotFound { .. }
                | Self::SupplierNotFound { .. }
                | Self::PurchaseNotFound { .. }
                | Self::SaleNotFound { .. }
        )
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::Conflict { message },
            _ => Self::Database(err),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::ProductNotFound { id: 1 }.is_not_found());
        assert!(Error::SaleNotFound { id: 1 }.is_not_found());
        assert!(!Error::Unauthorized.is_not_found());
        assert!(!Error::validation("bad").is_not_found());
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = Error::InsufficientStock {
            product_id: 7,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: 3 available, 5 requested"
        );
    }

    #[test]
    fn test_plain_db_error_stays_database() {
        let err: Error = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, Error::Database(_)));
    }
}
