use axum::http::HeaderMap;
use std::sync::Arc;

use crate::database::models::User;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::security::password::verify_password;

pub const USERNAME_HEADER: &str = "x-api-username";
pub const PASSWORD_HEADER: &str = "x-api-password";

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both headers present and non-empty, otherwise authentication is required.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let username = header_value(headers, USERNAME_HEADER);
        let password = header_value(headers, PASSWORD_HEADER);

        match (username, password) {
            (Some(username), Some(password)) => Ok(Self { username, password }),
            _ => Err(ApiError::auth_required("Full authentication is required to access this resource.")),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Checks header credentials against stored users.
#[derive(Clone)]
pub struct PasswordAuthenticator {
    users: Arc<dyn UserRepository>,
}

impl PasswordAuthenticator {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Unknown users, inactive users and wrong passwords all fail the same way.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let user = self
            .users
            .load_user_by_identifier(&credentials.username)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| ApiError::auth_failed(INVALID_CREDENTIALS))?;

        if !verify_password(&credentials.password, &user.password) {
            tracing::info!(username = %credentials.username, "password authentication failed");
            return Err(ApiError::auth_failed(INVALID_CREDENTIALS));
        }

        Ok(user)
    }
}
