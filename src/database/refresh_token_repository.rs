use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewRefreshToken, RefreshToken, User};
use crate::database::repository::{map_unique_violation, Repository};

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persists `token` bound to `user`.
    async fn save_token(&self, token: NewRefreshToken, user: &User) -> Result<RefreshToken, DatabaseError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError>;
}

pub struct PgRefreshTokenRepository {
    repository: Repository<RefreshToken>,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: Repository::new(pool),
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn save_token(&self, token: NewRefreshToken, user: &User) -> Result<RefreshToken, DatabaseError> {
        let saved = sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (refresh_token, username, valid, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, refresh_token, username, valid, user_id",
        )
        .bind(&token.refresh_token)
        .bind(&token.username)
        .bind(token.valid)
        .bind(user.id)
        .fetch_one(self.repository.pool())
        .await
        .map_err(|e| map_unique_violation(e, "refresh token"))?;

        Ok(saved)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        match self
            .repository
            .find_unique_by(&[("refresh_token", json!(token))])
            .await
        {
            Ok(found) => Ok(Some(found)),
            Err(DatabaseError::NotFound(_)) => Ok(None),
            Err(other) => Err(other),
        }
    }
}
