// HTTP API Error Types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};

use crate::auth::JwtError;
use crate::database::DatabaseError;
use crate::listing::ListingError;
use crate::response::error_body;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidPagination { message: String, detailed: Option<String> },

    // 401 Unauthorized
    AuthRequired(String),
    InvalidRefreshToken(String),

    // 403 Forbidden
    AuthFailed(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidPagination { .. } => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired(_) | ApiError::InvalidRefreshToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::AuthFailed(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Error type reported as `status_message`
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidPagination { .. } => "INVALID_PAGINATION",
            ApiError::AuthRequired(_) => "AUTH_REQUIRED",
            ApiError::InvalidRefreshToken(_) | ApiError::AuthFailed(_) => "AUTH_FAILED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::AuthRequired(msg)
            | ApiError::InvalidRefreshToken(msg)
            | ApiError::AuthFailed(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::InvalidPagination { message, .. } => message,
        }
    }

    pub fn detailed(&self) -> Option<&str> {
        match self {
            ApiError::InvalidPagination { detailed, .. } => detailed.as_deref(),
            _ => None,
        }
    }

    /// Renders the error, naming the logged-in user when there is one.
    /// The error itself rides along in the response extensions so later
    /// layers can re-render it.
    pub fn into_response_for(self, current_user: Option<&str>) -> Response {
        let status = self.status_code();
        let body = error_body(self.error_type(), self.message(), self.detailed(), current_user);

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response.extensions_mut().insert(self);
        response
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn auth_required(message: impl Into<String>) -> Self {
        ApiError::AuthRequired(message.into())
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        ApiError::AuthFailed(message.into())
    }

    pub fn invalid_refresh_token(message: impl Into<String>) -> Self {
        ApiError::InvalidRefreshToken(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Duplicate(what) => ApiError::conflict(format!("{} already exists", what)),
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            other => {
                tracing::error!("Database query error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::InvalidPaginationParameters { .. } => ApiError::InvalidPagination {
                message: "Invalid pagination parameters.".to_string(),
                detailed: Some(err.to_string()),
            },
            ListingError::QueryExecution(db_err) => db_err.into(),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(msg) => {
                tracing::debug!("Rejected JWT: {}", msg);
                ApiError::auth_required("Invalid JWT Token")
            }
            other => {
                tracing::error!("JWT error: {}", other);
                ApiError::internal_server_error("Unable to issue token")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_for(None)
    }
}
