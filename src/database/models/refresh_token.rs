use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::User;
use crate::database::repository::Entity;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub refresh_token: String,
    pub username: String,
    pub valid: DateTime<Utc>,
    pub user_id: i64,
}

impl RefreshToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid >= now
    }
}

impl Entity for RefreshToken {
    const TABLE: &'static str = "refresh_tokens";
    const ALIAS: &'static str = "rt";
}

/// A freshly generated token, not yet bound to a user row.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub refresh_token: String,
    pub username: String,
    pub valid: DateTime<Utc>,
}

impl NewRefreshToken {
    /// 128 hex characters of randomness, valid for `ttl_secs` from now.
    pub fn for_user_with_ttl(user: &User, ttl_secs: u64) -> Self {
        let refresh_token: String = (0..4).map(|_| Uuid::new_v4().simple().to_string()).collect();
        let ttl = Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX / 1000));

        Self {
            refresh_token,
            username: user.username.clone(),
            valid: Utc::now() + ttl,
        }
    }
}

impl std::fmt::Display for NewRefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.refresh_token)
    }
}
