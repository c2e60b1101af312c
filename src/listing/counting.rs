use std::marker::PhantomData;

use async_trait::async_trait;

use super::fetcher::PageFetcher;
use crate::database::{DatabaseError, Executor, QueryBuilder};

/// Page fetcher over a [`QueryBuilder`], with an opt-in total count.
///
/// The count runs on [`QueryBuilder::count_distinct_root`], an independent
/// copy of the builder, so it never disturbs the row query.
pub struct CountingFetcher<E, T> {
    query_builder: QueryBuilder,
    executor: E,
    auto_count: bool,
    _record: PhantomData<fn() -> T>,
}

impl<E, T> CountingFetcher<E, T>
where
    E: Executor<T>,
{
    pub fn new(query_builder: QueryBuilder, executor: E, auto_count: bool) -> Self {
        Self {
            query_builder,
            executor,
            auto_count,
            _record: PhantomData,
        }
    }

    pub fn query_builder(&self) -> &QueryBuilder {
        &self.query_builder
    }
}

#[async_trait]
impl<E, T> PageFetcher for CountingFetcher<E, T>
where
    E: Executor<T>,
    T: Send + 'static,
{
    type Record = T;

    fn set_offset(&mut self, offset: u64) {
        self.query_builder.set_first_result(Some(offset));
    }

    fn set_limit(&mut self, limit: u64) {
        self.query_builder.set_max_results(Some(limit));
    }

    async fn fetch(&self) -> Result<Vec<T>, DatabaseError> {
        self.executor.fetch_all(&self.query_builder.to_sql()).await
    }

    fn has_count(&self) -> bool {
        self.auto_count
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        if !self.auto_count {
            return Ok(0);
        }

        let statement = self.query_builder.count_distinct_root().to_sql();
        match self.executor.fetch_scalar(&statement).await? {
            Some(total) => Ok(u64::try_from(total).unwrap_or(0)),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{SortDirection, SqlStatement};
    use crate::listing::ListingResult;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        statements: Mutex<Vec<String>>,
        total: Option<i64>,
    }

    #[async_trait]
    impl Executor<u32> for Recorder {
        async fn fetch_all(&self, statement: &SqlStatement) -> Result<Vec<u32>, DatabaseError> {
            self.statements.lock().unwrap().push(statement.query.clone());
            Ok(vec![1, 2, 3])
        }

        async fn fetch_scalar(&self, statement: &SqlStatement) -> Result<Option<i64>, DatabaseError> {
            self.statements.lock().unwrap().push(statement.query.clone());
            Ok(self.total)
        }
    }

    fn builder() -> QueryBuilder {
        QueryBuilder::new("users", "u")
            .unwrap()
            .group_by("u.id")
            .order_by("u.id", SortDirection::Asc)
    }

    #[tokio::test]
    async fn fetch_applies_bounds() {
        let mut fetcher = CountingFetcher::new(builder(), Recorder::default(), false);
        fetcher.set_offset(4);
        fetcher.set_limit(3);

        assert_eq!(fetcher.fetch().await.unwrap(), vec![1, 2, 3]);
        let statements = fetcher.executor.statements.lock().unwrap();
        assert_eq!(
            statements[0],
            "SELECT u.* FROM \"users\" u GROUP BY u.id ORDER BY u.id ASC LIMIT 3 OFFSET 4"
        );
    }

    #[tokio::test]
    async fn count_disabled_never_queries() {
        let fetcher = CountingFetcher::new(builder(), Recorder { total: Some(9), ..Default::default() }, false);
        assert!(!fetcher.has_count());
        assert_eq!(fetcher.count().await.unwrap(), 0);
        assert!(fetcher.executor.statements.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn count_uses_stripped_copy() {
        let mut fetcher = CountingFetcher::new(builder(), Recorder { total: Some(9), ..Default::default() }, true);
        fetcher.set_offset(20);
        fetcher.set_limit(11);

        assert!(fetcher.has_count());
        assert_eq!(fetcher.count().await.unwrap(), 9);
        {
            let statements = fetcher.executor.statements.lock().unwrap();
            assert_eq!(statements[0], "SELECT COUNT(DISTINCT u.id) FROM \"users\" u");
        }

        // row query still carries its clauses and bounds
        let row_sql = fetcher.query_builder().to_sql().query;
        assert!(row_sql.ends_with("GROUP BY u.id ORDER BY u.id ASC LIMIT 11 OFFSET 20"));
    }

    #[tokio::test]
    async fn missing_count_row_is_zero() {
        let fetcher = CountingFetcher::new(builder(), Recorder::default(), true);
        assert_eq!(fetcher.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn listing_drives_counted_page() {
        let fetcher = CountingFetcher::new(builder(), Recorder { total: Some(5), ..Default::default() }, true);
        let mut listing = ListingResult::new(fetcher, 2, 2).unwrap();

        assert_eq!(listing.total_count().await.unwrap(), 5);
        assert_eq!(listing.fetch_all().await.unwrap(), &[1, 2]);
        assert!(listing.has_next().await.unwrap());

        let statements = listing.fetcher().executor.statements.lock().unwrap().clone();
        assert_eq!(
            statements,
            vec![
                "SELECT COUNT(DISTINCT u.id) FROM \"users\" u".to_string(),
                "SELECT u.* FROM \"users\" u GROUP BY u.id ORDER BY u.id ASC LIMIT 3 OFFSET 2".to_string(),
            ]
        );

        // limit is back to the page size once the extra row has been read
        let query_builder = listing.fetcher().query_builder();
        assert_eq!(query_builder.first_result(), Some(2));
        assert_eq!(query_builder.max_results(), Some(2));
        assert!(query_builder.to_sql().query.ends_with("LIMIT 2 OFFSET 2"));
    }
}
