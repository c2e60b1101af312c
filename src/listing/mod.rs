//! Offset-based pagination over a [`PageFetcher`].
//!
//! A [`ListingResult`] serves one page request. It asks the fetcher for one
//! row more than the page size to learn whether a next page exists, runs
//! that fetch at most once, and hands out at most `page_size` records.

pub mod counting;
pub mod fetcher;
pub mod precounted;

pub use counting::CountingFetcher;
pub use fetcher::PageFetcher;
pub use precounted::PrecountedFetcher;

use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Invalid pagination parameters: page={page}, page_size={page_size} (both must be positive)")]
    InvalidPaginationParameters { page: u32, page_size: u32 },

    #[error("Query execution failed: {0}")]
    QueryExecution(#[from] DatabaseError),
}

#[derive(Debug)]
struct Page<R> {
    results: Vec<R>,
    has_next: bool,
}

pub struct ListingResult<F: PageFetcher> {
    fetcher: F,
    current_page: u32,
    page_size: u32,
    page: Option<Page<F::Record>>,
}

impl<F: PageFetcher> ListingResult<F> {
    /// `current_page` is 1-based. Zero page numbers and zero page sizes are
    /// rejected.
    pub fn new(fetcher: F, current_page: u32, page_size: u32) -> Result<Self, ListingError> {
        if current_page == 0 || page_size == 0 {
            return Err(ListingError::InvalidPaginationParameters {
                page: current_page,
                page_size,
            });
        }

        Ok(Self {
            fetcher,
            current_page,
            page_size,
            page: None,
        })
    }

    /// Records of the requested page, at most `page_size` of them.
    pub async fn fetch_all(&mut self) -> Result<&[F::Record], ListingError> {
        let page = self.execute_once().await?;
        Ok(&page.results)
    }

    pub async fn has_next(&mut self) -> Result<bool, ListingError> {
        let page = self.execute_once().await?;
        Ok(page.has_next)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total matching rows, or 0 when the fetcher does not count. Does not
    /// depend on the page having been fetched.
    pub async fn total_count(&self) -> Result<u64, ListingError> {
        if self.fetcher.has_count() {
            Ok(self.fetcher.count().await?)
        } else {
            Ok(0)
        }
    }

    /// Consumes the listing, returning the page records and the next-page flag.
    pub async fn into_page(mut self) -> Result<(Vec<F::Record>, bool), ListingError> {
        let page = match self.page.take() {
            Some(page) => page,
            None => self.execute().await?,
        };
        Ok((page.results, page.has_next))
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn execute_once(&mut self) -> Result<&Page<F::Record>, ListingError> {
        let page = match self.page.take() {
            Some(page) => page,
            None => self.execute().await?,
        };
        Ok(self.page.insert(page))
    }

    async fn execute(&mut self) -> Result<Page<F::Record>, ListingError> {
        let limit = u64::from(self.page_size);
        let offset = u64::from(self.current_page - 1) * limit;

        self.fetcher.set_offset(offset);
        // one extra row tells whether a next page exists
        self.fetcher.set_limit(limit + 1);

        let fetched = self.fetcher.fetch().await;

        self.fetcher.set_limit(limit);
        let mut results = fetched?;

        let has_next = results.len() as u64 > limit;
        if has_next {
            results.truncate(self.page_size as usize);
        }

        tracing::debug!(
            page = self.current_page,
            page_size = self.page_size,
            rows = results.len(),
            has_next,
            "listing page fetched"
        );

        Ok(Page { results, has_next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serves a slice of `rows` according to the configured bounds and
    /// counts how often it is hit.
    struct FakeFetcher {
        rows: Vec<&'static str>,
        offset: u64,
        limit: u64,
        total: Option<u64>,
        fetches: Arc<AtomicUsize>,
        counts: Arc<AtomicUsize>,
        bounds_seen: Arc<std::sync::Mutex<Vec<(u64, u64)>>>,
        fail: bool,
    }

    impl FakeFetcher {
        fn new(rows: Vec<&'static str>) -> Self {
            Self {
                rows,
                offset: 0,
                limit: u64::MAX,
                total: None,
                fetches: Arc::new(AtomicUsize::new(0)),
                counts: Arc::new(AtomicUsize::new(0)),
                bounds_seen: Arc::new(std::sync::Mutex::new(Vec::new())),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        type Record = &'static str;

        fn set_offset(&mut self, offset: u64) {
            self.offset = offset;
        }

        fn set_limit(&mut self, limit: u64) {
            self.limit = limit;
        }

        async fn fetch(&self) -> Result<Vec<&'static str>, DatabaseError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.bounds_seen.lock().unwrap().push((self.offset, self.limit));
            if self.fail {
                return Err(DatabaseError::QueryError("relation does not exist".to_string()));
            }
            Ok(self
                .rows
                .iter()
                .skip(self.offset as usize)
                .take(self.limit as usize)
                .copied()
                .collect())
        }

        fn has_count(&self) -> bool {
            self.total.is_some()
        }

        async fn count(&self) -> Result<u64, DatabaseError> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            Ok(self.total.unwrap_or(0))
        }
    }

    #[tokio::test]
    async fn first_page_with_more_rows() {
        let fetcher = FakeFetcher::new(vec!["A", "B", "C"]);
        let bounds = fetcher.bounds_seen.clone();
        let mut listing = ListingResult::new(fetcher, 1, 2).unwrap();

        assert_eq!(listing.fetch_all().await.unwrap(), &["A", "B"]);
        assert!(listing.has_next().await.unwrap());
        assert_eq!(*bounds.lock().unwrap(), vec![(0, 3)]);
    }

    #[tokio::test]
    async fn last_partial_page() {
        let fetcher = FakeFetcher::new(vec!["A", "B", "C"]);
        let bounds = fetcher.bounds_seen.clone();
        let mut listing = ListingResult::new(fetcher, 2, 2).unwrap();

        assert_eq!(listing.fetch_all().await.unwrap(), &["C"]);
        assert!(!listing.has_next().await.unwrap());
        assert_eq!(*bounds.lock().unwrap(), vec![(2, 3)]);
    }

    #[tokio::test]
    async fn exactly_page_size_rows() {
        let mut listing = ListingResult::new(FakeFetcher::new(vec!["A", "B"]), 1, 2).unwrap();
        assert!(!listing.has_next().await.unwrap());
        assert_eq!(listing.fetch_all().await.unwrap(), &["A", "B"]);
    }

    #[tokio::test]
    async fn fewer_rows_than_page_size() {
        let mut listing = ListingResult::new(FakeFetcher::new(vec!["A"]), 1, 5).unwrap();
        assert_eq!(listing.fetch_all().await.unwrap(), &["A"]);
        assert!(!listing.has_next().await.unwrap());
    }

    #[tokio::test]
    async fn fetches_at_most_once() {
        let fetcher = FakeFetcher::new(vec!["A", "B", "C", "D"]);
        let fetches = fetcher.fetches.clone();
        let mut listing = ListingResult::new(fetcher, 1, 3).unwrap();

        listing.fetch_all().await.unwrap();
        listing.has_next().await.unwrap();
        listing.fetch_all().await.unwrap();
        listing.total_count().await.unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn has_next_first_also_fetches_once() {
        let fetcher = FakeFetcher::new(vec!["A", "B", "C", "D"]);
        let fetches = fetcher.fetches.clone();
        let mut listing = ListingResult::new(fetcher, 1, 3).unwrap();

        assert!(listing.has_next().await.unwrap());
        assert_eq!(listing.fetch_all().await.unwrap(), &["A", "B", "C"]);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn limit_is_restored_after_fetch() {
        let mut listing = ListingResult::new(FakeFetcher::new(vec!["A", "B", "C"]), 1, 2).unwrap();
        listing.fetch_all().await.unwrap();
        assert_eq!(listing.fetcher().limit, 2);
        assert_eq!(listing.fetcher().offset, 0);
    }

    #[tokio::test]
    async fn total_count_without_fetch() {
        let mut fetcher = FakeFetcher::new(vec!["A", "B", "C"]);
        fetcher.total = Some(3);
        let fetches = fetcher.fetches.clone();
        let listing = ListingResult::new(fetcher, 1, 2).unwrap();

        assert_eq!(listing.total_count().await.unwrap(), 3);
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn total_count_skips_uncounted_fetcher() {
        let fetcher = FakeFetcher::new(vec!["A"]);
        let counts = fetcher.counts.clone();
        let listing = ListingResult::new(fetcher, 1, 2).unwrap();

        assert_eq!(listing.total_count().await.unwrap(), 0);
        assert_eq!(counts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn query_errors_propagate() {
        let mut fetcher = FakeFetcher::new(vec!["A"]);
        fetcher.fail = true;
        let mut listing = ListingResult::new(fetcher, 1, 2).unwrap();

        assert!(matches!(
            listing.fetch_all().await,
            Err(ListingError::QueryExecution(DatabaseError::QueryError(_)))
        ));
        // limit restored even when the fetch failed
        assert_eq!(listing.fetcher().limit, 2);
    }

    #[test]
    fn rejects_non_positive_parameters() {
        assert!(matches!(
            ListingResult::new(FakeFetcher::new(vec![]), 0, 10),
            Err(ListingError::InvalidPaginationParameters { page: 0, page_size: 10 })
        ));
        assert!(matches!(
            ListingResult::new(FakeFetcher::new(vec![]), 1, 0),
            Err(ListingError::InvalidPaginationParameters { page: 1, page_size: 0 })
        ));
    }

    #[tokio::test]
    async fn into_page_returns_trimmed_rows() {
        let listing = ListingResult::new(FakeFetcher::new(vec!["A", "B", "C"]), 1, 2).unwrap();
        assert_eq!(listing.current_page(), 1);
        assert_eq!(listing.page_size(), 2);
        let (rows, has_next) = listing.into_page().await.unwrap();
        assert_eq!(rows, vec!["A", "B"]);
        assert!(has_next);
    }
}
