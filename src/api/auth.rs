//! Bearer-token authentication.
//!
//! The middleware verifies the access token in `Authorization: Bearer <token>`, checks
//! that its account still exists and stores an [`AccountContext`] in the request
//! extensions for handlers to pick up.

use crate::{
    api::{AppState, token::TokenKind},
    core::{AccountId, account::get_account},
    errors::{Error, Result},
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AccountContext {
    /// Account every owned row is scoped to
    pub account_id: AccountId,
    /// Login name, for logs
    pub username: String,
}

/// Rejects requests without a valid access token with 401.
pub async fn require_account(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = extract_bearer(req.headers()).ok_or(Error::Unauthorized)?;
    let claims = state.jwt.verify(token, TokenKind::Access)?;

    let account = get_account(state.database.as_ref(), claims.sub)
        .await
        .map_err(|e| if e.is_not_found() { Error::Unauthorized } else { e })?;

    debug!(account_id = account.id, "Authenticated request");
    req.extensions_mut().insert(AccountContext {
        account_id: account.id,
        username: account.username,
    });

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer(&headers), Some("abc123"));
    }
}
