// POST /login and POST /token/refresh

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::database::models::NewRefreshToken;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::security::{Credentials, PasswordAuthenticator};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Exchanges `X-API-USERNAME` / `X-API-PASSWORD` for an access token and a
/// freshly stored refresh token.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse<TokenPair>, ApiError> {
    let credentials = Credentials::from_headers(&headers)?;
    let user = PasswordAuthenticator::new(state.users.clone())
        .authenticate(&credentials)
        .await?;

    let token = state.jwt.create(&user)?;

    let refresh_token =
        NewRefreshToken::for_user_with_ttl(&user, state.config.security.refresh_token_ttl_secs);
    let saved = state.refresh_tokens.save_token(refresh_token, &user).await?;

    tracing::info!(username = %user.username, "user logged in");

    Ok(ApiResponse::success(TokenPair {
        token,
        refresh_token: saved.refresh_token,
    }))
}

/// Issues a new access token for a stored, unexpired refresh token.
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<ApiResponse<TokenPair>, ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::invalid_refresh_token("Missing JWT Refresh Token"))?;
    if payload.refresh_token.is_empty() {
        return Err(ApiError::invalid_refresh_token("Missing JWT Refresh Token"));
    }

    let stored = state
        .refresh_tokens
        .find_by_token(&payload.refresh_token)
        .await?
        .ok_or_else(|| ApiError::invalid_refresh_token("JWT Refresh Token Not Found"))?;

    if !stored.is_valid_at(Utc::now()) {
        return Err(ApiError::invalid_refresh_token("Invalid JWT Refresh Token"));
    }

    let user = state
        .users
        .load_user_by_identifier(&stored.username)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::invalid_refresh_token("Invalid JWT Refresh Token"))?;

    let token = state.jwt.create(&user)?;

    Ok(ApiResponse::success(TokenPair {
        token,
        refresh_token: stored.refresh_token,
    }))
}
