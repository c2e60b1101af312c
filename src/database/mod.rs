pub mod executor;
pub mod manager;
pub mod models;
pub mod native_query;
pub mod query_builder;
pub mod refresh_token_repository;
pub mod repository;
pub mod types;
pub mod user_repository;

pub use executor::Executor;
pub use manager::{DatabaseError, DatabaseManager};
pub use native_query::NativeQuery;
pub use query_builder::QueryBuilder;
pub use refresh_token_repository::{PgRefreshTokenRepository, RefreshTokenRepository};
pub use repository::{Entity, Repository};
pub use types::{SortDirection, SqlStatement};
pub use user_repository::{PgUserRepository, UserListing, UserRepository};
