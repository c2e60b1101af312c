use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, status, users};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Routes of the public-facing service
pub fn external_app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/status", get(status::external_status))
        .route("/health", get(status::health))
        .route("/login", post(auth::login))
        .route("/token/refresh", post(auth::refresh))
        // Bearer-protected
        .merge(user_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/me", get(users::me))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

/// Routes of the service only reachable inside the deployment
pub fn internal_app() -> Router {
    Router::new()
        .route("/status", get(status::internal_status))
        .layer(TraceLayer::new_for_http())
}

/// Binds `0.0.0.0:port` and serves `app` until ctrl-c.
pub async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
