use serde_json::Value;
use sqlx::{self, postgres::PgRow, FromRow, PgPool};

use crate::database::executor::Executor;
use crate::database::manager::DatabaseError;
use crate::database::native_query::NativeQuery;
use crate::database::query_builder::QueryBuilder;
use crate::database::types::validate_identifier;
use crate::listing::{CountingFetcher, ListingError, ListingResult, PrecountedFetcher};

/// A row type stored in one table.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    /// Alias of the table inside generated queries.
    const ALIAS: &'static str;
}

/// Queries shared by every entity repository.
pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn create_query_builder(&self) -> Result<QueryBuilder, DatabaseError> {
        QueryBuilder::new(T::TABLE, T::ALIAS)
    }

    pub async fn fetch(&self, query_builder: &QueryBuilder) -> Result<Vec<T>, DatabaseError> {
        Executor::<T>::fetch_all(&self.pool, &query_builder.to_sql()).await
    }

    /// Rows whose columns equal all of `criteria`.
    pub async fn find_by(&self, criteria: &[(&str, Value)]) -> Result<Vec<T>, DatabaseError> {
        let mut query_builder = self.create_query_builder()?;
        for (column, value) in criteria {
            validate_identifier(column)?;
            query_builder =
                query_builder.and_where(&format!("{}.{}", T::ALIAS, column), "=", value.clone());
        }
        self.fetch(&query_builder).await
    }

    /// Exactly one row matching `criteria`, otherwise an error.
    pub async fn find_unique_by(&self, criteria: &[(&str, Value)]) -> Result<T, DatabaseError> {
        let mut rows = self.find_by(criteria).await?;
        match rows.len() {
            0 => Err(DatabaseError::NotFound(format!(
                "{}: 0 results found on given criteria.",
                T::TABLE
            ))),
            1 => Ok(rows.remove(0)),
            _ => Err(DatabaseError::NonUnique(format!(
                "{}: multiple results found on given criteria.",
                T::TABLE
            ))),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let query = format!("DELETE FROM \"{}\" WHERE id = $1", T::TABLE);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Listing over a query builder; with `auto_count` the total is counted
    /// over distinct root rows.
    pub fn paginate_query_builder(
        &self,
        query_builder: QueryBuilder,
        page: u32,
        page_size: u32,
        auto_count: bool,
    ) -> Result<ListingResult<CountingFetcher<PgPool, T>>, ListingError> {
        ListingResult::new(
            CountingFetcher::new(query_builder, self.pool.clone(), auto_count),
            page,
            page_size,
        )
    }

    /// Listing over hand-written SQL with a total computed elsewhere (0 = unknown).
    pub fn paginate_query(
        &self,
        query: NativeQuery,
        page: u32,
        page_size: u32,
        count: u64,
    ) -> Result<ListingResult<PrecountedFetcher<PgPool, T>>, ListingError> {
        ListingResult::new(
            PrecountedFetcher::new(query, self.pool.clone(), count),
            page,
            page_size,
        )
    }
}

/// Unique violations surface as [`DatabaseError::Duplicate`].
pub(crate) fn map_unique_violation(err: sqlx::Error, what: &str) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return DatabaseError::Duplicate(what.to_string());
        }
    }
    DatabaseError::Sqlx(err)
}
