use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /status on the external service, including the internal one's answer
pub async fn external_status(State(state): State<AppState>) -> Html<String> {
    let url = &state.config.server.internal_status_url;

    let internal = match fetch_internal_status(&state.http, url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(%url, "internal status unavailable: {}", e);
            "unavailable".to_string()
        }
    };

    Html(format!("external: OK<br>internal: {}", internal))
}

async fn fetch_internal_status(client: &reqwest::Client, url: &str) -> reqwest::Result<String> {
    client.get(url).send().await?.error_for_status()?.text().await
}

/// GET /status on the internal service
pub async fn internal_status() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// GET /health
pub async fn health() -> axum::response::Response {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok"
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            ApiError::service_unavailable("database unavailable").into_response()
        }
    }
}
