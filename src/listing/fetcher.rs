use async_trait::async_trait;

use crate::database::DatabaseError;

/// A bounded (offset + limit) view over some query, optionally able to
/// report how many rows the whole query matches.
///
/// Offset and limit are plain configuration: nothing touches the data
/// source until [`PageFetcher::fetch`] or [`PageFetcher::count`] runs.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Record: Send;

    /// Zero-based row offset for the next fetch.
    fn set_offset(&mut self, offset: u64);

    /// Maximum number of rows returned by the next fetch.
    fn set_limit(&mut self, limit: u64);

    /// Runs the query with the configured bounds. Rows come back in the
    /// query's own order.
    async fn fetch(&self) -> Result<Vec<Self::Record>, DatabaseError>;

    /// Whether [`PageFetcher::count`] yields a meaningful total.
    fn has_count(&self) -> bool;

    /// Total number of rows matched by the query, ignoring offset and limit.
    async fn count(&self) -> Result<u64, DatabaseError>;
}

#[async_trait]
impl<F> PageFetcher for Box<F>
where
    F: PageFetcher + ?Sized,
{
    type Record = F::Record;

    fn set_offset(&mut self, offset: u64) {
        (**self).set_offset(offset)
    }

    fn set_limit(&mut self, limit: u64) {
        (**self).set_limit(limit)
    }

    async fn fetch(&self) -> Result<Vec<Self::Record>, DatabaseError> {
        (**self).fetch().await
    }

    fn has_count(&self) -> bool {
        (**self).has_count()
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        (**self).count().await
    }
}
