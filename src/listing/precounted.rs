use std::marker::PhantomData;

use async_trait::async_trait;

use super::fetcher::PageFetcher;
use crate::database::{DatabaseError, Executor, NativeQuery};

/// Page fetcher over a [`NativeQuery`] whose total is already known.
///
/// A total of zero means "not counted".
pub struct PrecountedFetcher<E, T> {
    query: NativeQuery,
    executor: E,
    count: u64,
    _record: PhantomData<fn() -> T>,
}

impl<E, T> PrecountedFetcher<E, T>
where
    E: Executor<T>,
{
    pub fn new(query: NativeQuery, executor: E, count: u64) -> Self {
        Self {
            query,
            executor,
            count,
            _record: PhantomData,
        }
    }

    pub fn query(&self) -> &NativeQuery {
        &self.query
    }
}

#[async_trait]
impl<E, T> PageFetcher for PrecountedFetcher<E, T>
where
    E: Executor<T>,
    T: Send + 'static,
{
    type Record = T;

    fn set_offset(&mut self, offset: u64) {
        self.query.set_first_result(Some(offset));
    }

    fn set_limit(&mut self, limit: u64) {
        self.query.set_max_results(Some(limit));
    }

    async fn fetch(&self) -> Result<Vec<T>, DatabaseError> {
        self.executor.fetch_all(&self.query.to_sql()).await
    }

    fn has_count(&self) -> bool {
        self.count > 0
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        Ok(self.count)
    }
}
