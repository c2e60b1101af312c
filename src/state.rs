use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgRefreshTokenRepository, PgUserRepository, RefreshTokenRepository, UserRepository};

/// Shared handles for the external service
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub jwt: Arc<JwtKeys>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        jwt: JwtKeys,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            users,
            refresh_tokens,
            jwt: Arc::new(jwt),
            http,
        })
    }

    /// Postgres-backed repositories and keys from `config`.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let pool = DatabaseManager::pool().await?;
        let jwt = JwtKeys::from_config(&config.security)?;

        Self::new(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgRefreshTokenRepository::new(pool)),
            jwt,
        )
    }
}
