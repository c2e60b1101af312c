use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::repository::Entity;

pub const ROLE_USER: &str = "ROLE_USER";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Every account carries the base role; there are no stored roles yet.
    pub fn roles(&self) -> Vec<String> {
        vec![ROLE_USER.to_string()]
    }

    /// The identifier used by authentication (the username)
    pub fn user_identifier(&self) -> &str {
        &self.username
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const ALIAS: &'static str = "u";
}

/// Insert payload; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}
