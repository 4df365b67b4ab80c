//! HS256 access/refresh tokens.
//!
//! Access tokens authenticate API calls; refresh tokens are only accepted by
//! `POST /token/refresh` to mint a new access token.

use crate::{
    config::settings::Settings,
    core::AccountId,
    entities::account,
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Presented as `Authorization: Bearer` on API calls
    Access,
    /// Exchanged for a new access token
    Refresh,
}

/// Signed token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: AccountId,
    /// Login name at issue time
    pub username: String,
    /// Access or refresh
    pub token_type: TokenKind,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// An access token together with the refresh token that can renew it.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived API token
    pub access: String,
    /// Longer-lived renewal token
    pub refresh: String,
}

/// Signing and verification keys plus token lifetimes.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    /// Builds keys from a shared secret.
    #[must_use]
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Keys from `jwt_secret` and the configured lifetimes.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.jwt_secret.as_bytes(),
            Duration::minutes(settings.access_token_minutes),
            Duration::days(settings.refresh_token_days),
        )
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| {
            Error::Auth {
                message: format!("failed to sign token: {e}"),
            }
        })
    }

    /// Issues one token of `kind` for `account`, valid from `now`.
    pub fn issue(&self, account: &account::Model, kind: TokenKind, now: DateTime<Utc>) -> Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        self.sign(&Claims {
            sub: account.id,
            username: account.username.clone(),
            token_type: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        })
    }

    /// Issues a fresh access/refresh pair.
    pub fn issue_pair(&self, account: &account::Model) -> Result<TokenPair> {
        let now = Utc::now();
        Ok(TokenPair {
            access: self.issue(account, TokenKind::Access, now)?,
            refresh: self.issue(account, TokenKind::Refresh, now)?,
        })
    }

    /// Checks signature, expiry and kind.
    ///
    /// # Errors
    /// Every rejection is [`Error::Unauthorized`].
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|_| Error::Unauthorized)?;

        if data.claims.token_type != kind {
            return Err(Error::Unauthorized);
        }
        Ok(data.claims)
    }
}
