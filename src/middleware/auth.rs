use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The user behind the bearer token of the current request
#[derive(Clone, Debug)]
pub struct LoggedInUser {
    user: User,
}

impl LoggedInUser {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn into_user(self) -> User {
        self.user
    }
}

/// JWT authentication middleware that validates tokens and loads the user.
///
/// Errors produced further down the stack are re-rendered with the
/// logged-in user in their envelope.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    let logged_in = LoggedInUser::new(user);
    request.extensions_mut().insert(logged_in.clone());

    let response = next.run(request).await;
    match response.extensions().get::<ApiError>().cloned() {
        Some(err) => err.into_response_for(Some(logged_in.username())),
        None => response,
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = extract_jwt_from_headers(headers).map_err(ApiError::auth_required)?;
    let claims = state.jwt.decode(&token)?;

    state
        .users
        .load_user_by_identifier(&claims.username)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::auth_required("Invalid JWT Token"))
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "JWT Token not found".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("JWT Token not found".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
