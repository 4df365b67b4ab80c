//! Account registration and password login.
//!
//! Passwords are stored as bcrypt hashes only. Hashing and verification are CPU bound,
//! so both run on the blocking pool instead of the async workers.

use crate::{
    core::{AccountId, require_email, require_text},
    entities::{Account, account},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::{info, warn};

/// bcrypt only looks at the first 72 bytes, so longer passwords are refused outright.
const MAX_PASSWORD_BYTES: usize = 72;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Fields accepted at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    /// Unique login name
    pub username: String,
    /// Contact email
    pub email: String,
    /// Plain-text password, hashed before it is stored
    pub password: String,
}

/// Credentials presented at login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    /// Login name
    pub username: String,
    /// Plain-text password
    pub password: String,
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::validation("password is required"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(Error::validation(format!(
            "password cannot be longer than {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| Error::Auth {
            message: format!("password hashing task failed: {e}"),
        })?
        .map_err(|e| Error::Auth {
            message: format!("failed to hash password: {e}"),
        })
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Auth {
            message: format!("password verification task failed: {e}"),
        })?
        .map_err(|e| Error::Auth {
            message: format!("failed to verify password: {e}"),
        })
}

/// Creates an account with a hashed password.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank or whitespace-containing username, a
/// malformed email or an empty/overlong password, and [`Error::Conflict`] when the
/// username is taken.
pub async fn register_account(db: &DatabaseConnection, input: RegisterInput) -> Result<account::Model> {
    let username = require_text("username", &input.username)?;
    if username.contains(char::is_whitespace) {
        return Err(Error::validation("username cannot contain whitespace"));
    }
    let email = require_email("email", &input.email)?;
    validate_password(&input.password)?;

    let account = account::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash_password(input.password).await?),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let account = account.insert(db).await?;
    info!(account_id = account.id, username = %account.username, "Account registered");
    Ok(account)
}

/// Checks a username/password pair.
///
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
///
/// # Errors
/// Returns [`Error::Unauthorized`] when the credentials do not match an account.
pub async fn authenticate(db: &DatabaseConnection, input: LoginInput) -> Result<account::Model> {
    let Some(account) = Account::find()
        .filter(account::Column::Username.eq(input.username.trim()))
        .one(db)
        .await?
    else {
        warn!("Login for unknown username");
        return Err(Error::Unauthorized);
    };

    if !verify_password(input.password, account.password_hash.clone()).await? {
        warn!(account_id = account.id, "Login with wrong password");
        return Err(Error::Unauthorized);
    }
    Ok(account)
}

/// Retrieves an account by id.
pub async fn get_account(db: &DatabaseConnection, account_id: AccountId) -> Result<account::Model> {
    Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn input(username: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "s3cret-pass".to_string(),
        }
    }

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_only_a_hash() -> Result<()> {
        let db = setup_test_db().await?;

        let account = register_account(&db, input("user1")).await?;

        assert_ne!(account.password_hash, "s3cret-pass");
        assert!(account.password_hash.starts_with("$2"));
        assert_eq!(get_account(&db, account.id).await?.username, "user1");
        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate() -> Result<()> {
        let db = setup_test_db().await?;
        let account = register_account(&db, input("user1")).await?;

        let found = authenticate(&db, login("user1", "s3cret-pass")).await?;
        assert_eq!(found.id, account.id);

        let result = authenticate(&db, login("user1", "wrong")).await;
        assert!(matches!(result.unwrap_err(), Error::Unauthorized));

        let result = authenticate(&db, login("nobody", "s3cret-pass")).await;
        assert!(matches!(result.unwrap_err(), Error::Unauthorized));
        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_username_is_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        register_account(&db, input("user1")).await?;

        let result = register_account(&db, input("user1")).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = register_account(&db, input("two words")).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = register_account(
            &db,
            RegisterInput {
                email: "broken".to_string(),
                ..input("user1")
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        for password in [String::new(), "x".repeat(73)] {
            let result = register_account(
                &db,
                RegisterInput {
                    password,
                    ..input("user1")
                },
            )
            .await;
            assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));
        }

        assert!(matches!(
            get_account(&db, 42).await.unwrap_err(),
            Error::AccountNotFound { id: 42 }
        ));

        Ok(())
    }
}
