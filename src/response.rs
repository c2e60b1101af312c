use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::listing::{ListingError, ListingResult, PageFetcher};

/// Single resource wrapped as `{"data": ...}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        match serde_json::to_value(&self.data) {
            Ok(data) => (status, Json(json!({ "data": data }))).into_response(),
            Err(e) => serialization_failure(e),
        }
    }
}

/// One page of a listing: `{"has_next": bool, "total": n, "data": [...]}`.
/// `total` is left out when the listing has no count.
#[derive(Debug)]
pub struct CollectionResponse<T: Serialize> {
    pub data: Vec<T>,
    pub has_next: bool,
    pub total: u64,
}

impl<T: Serialize> CollectionResponse<T> {
    /// Runs the listing (one page fetch plus the count, if any).
    pub async fn from_listing<F>(listing: ListingResult<F>) -> Result<Self, ListingError>
    where
        F: PageFetcher<Record = T>,
    {
        let total = listing.total_count().await?;
        let (data, has_next) = listing.into_page().await?;

        Ok(Self { data, has_next, total })
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut body = Map::new();
        body.insert("has_next".to_string(), Value::Bool(self.has_next));
        if self.total > 0 {
            body.insert("total".to_string(), json!(self.total));
        }
        body.insert("data".to_string(), serde_json::to_value(&self.data)?);
        Ok(Value::Object(body))
    }
}

impl<T: Serialize> IntoResponse for CollectionResponse<T> {
    fn into_response(self) -> Response {
        match self.to_json() {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => serialization_failure(e),
        }
    }
}

/// Error envelope shared by every failing request.
pub fn error_body(error_type: &str, message: &str, detailed: Option<&str>, current_user: Option<&str>) -> Value {
    let mut response = Map::new();
    response.insert("message".to_string(), json!(message));
    if let Some(detailed) = detailed {
        response.insert("detailed".to_string(), json!(detailed));
    }

    let current_user = match current_user {
        Some(username) => json!({ "username": username }),
        None => Value::Null,
    };

    json!({
        "status_message": error_type,
        "data": {
            "response": Value::Object(response),
            "current_user": current_user,
        }
    })
}

fn serialization_failure(e: serde_json::Error) -> Response {
    tracing::error!("Failed to serialize response data: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(error_body(
            "INTERNAL_SERVER_ERROR",
            "Failed to serialize response data",
            None,
            None,
        )),
    )
        .into_response()
}
