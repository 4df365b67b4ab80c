use crate::{
    api::{
        AppState,
        dto::{AccessTokenResponse, RegisterResponse, TokenPairResponse},
        token::TokenKind,
    },
    core::account::{self, LoginInput, RegisterInput},
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

/// Body of `POST /token/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token from registration or login
    pub refresh: String,
}

/// `POST /register` - creates an account and returns its first token pair.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let account = account::register_account(state.database.as_ref(), body).await?;
    let tokens = state.jwt.issue_pair(&account)?;
    Ok((StatusCode::CREATED, Json(RegisterResponse::new(account, tokens))))
}

/// `POST /token` - exchanges a username and password for a token pair.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<Json<TokenPairResponse>> {
    let account = account::authenticate(state.database.as_ref(), body).await?;
    Ok(Json(state.jwt.issue_pair(&account)?.into()))
}

/// `POST /token/refresh` - exchanges a refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>> {
    let claims = state.jwt.verify(&body.refresh, TokenKind::Refresh)?;
    let account = account::get_account(state.database.as_ref(), claims.sub)
        .await
        .map_err(|e| if e.is_not_found() { Error::Unauthorized } else { e })?;

    let access = state
        .jwt
        .issue(&account, TokenKind::Access, chrono::Utc::now())?;
    Ok(Json(AccessTokenResponse { access }))
}
