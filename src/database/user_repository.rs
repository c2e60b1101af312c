use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User};
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::{map_unique_violation, Entity, Repository};
use crate::database::types::SortDirection;
use crate::listing::{CountingFetcher, ListingError, ListingResult, PageFetcher};

/// Page of users, independent of the backing store.
pub type UserListing = ListingResult<Box<dyn PageFetcher<Record = User>>>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Case-insensitive lookup; `None` or an empty name finds nobody.
    async fn get_user_by_username(&self, username: Option<&str>) -> Result<Option<User>, DatabaseError>;

    /// Lookup used by authentication; surrounding whitespace is ignored.
    async fn load_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, DatabaseError> {
        self.get_user_by_username(Some(identifier.trim())).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    /// All users, one row per user, with the total counted.
    async fn paginate_get_all(&self, page: u32, page_size: u32) -> Result<UserListing, ListingError>;
}

pub struct PgUserRepository {
    repository: Repository<User>,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: Repository::new(pool),
        }
    }

    /// One row per user, oldest first.
    fn all_users_query() -> Result<QueryBuilder, DatabaseError> {
        Ok(QueryBuilder::new(User::TABLE, User::ALIAS)?
            .group_by("u.id")
            .order_by("u.id", SortDirection::Asc))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_user_by_username(&self, username: Option<&str>) -> Result<Option<User>, DatabaseError> {
        let username = match username {
            Some(name) if !name.is_empty() => name.to_lowercase(),
            _ => return Ok(None),
        };

        let query_builder = self
            .repository
            .create_query_builder()?
            .and_where("LOWER(u.username)", "=", username.clone());

        let mut users = self.repository.fetch(&query_builder).await?;
        match users.len() {
            0 => Ok(None),
            1 => Ok(Some(users.remove(0))),
            _ => Err(DatabaseError::NonUnique(format!(
                "several users match username '{}'",
                username
            ))),
        }
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, is_active, created_at)
             VALUES ($1, $2, TRUE, NOW())
             RETURNING id, username, password, is_active, created_at",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .fetch_one(self.repository.pool())
        .await
        .map_err(|e| map_unique_violation(e, &format!("user '{}'", new_user.username)))?;

        tracing::info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.repository.delete(id).await
    }

    async fn paginate_get_all(&self, page: u32, page_size: u32) -> Result<UserListing, ListingError> {
        let query_builder = Self::all_users_query()?;

        let fetcher: Box<dyn PageFetcher<Record = User>> = Box::new(CountingFetcher::new(
            query_builder,
            self.repository.pool().clone(),
            true,
        ));
        ListingResult::new(fetcher, page, page_size)
    }
}
