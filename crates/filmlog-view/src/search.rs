//! Keyword search fed one network page at a time.

use anyhow::Result;
use filmlog_api::{LocalLikeApi, LocalMovieApi, LocalPostApi};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::enrich::{EnrichedMovie, PerMovieMetrics, enrich_movies};
use crate::session::Session;

/// One page request issued by a [`SearchFeed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Search term.
    pub term: String,
    /// Page number, starting at 1.
    pub page: u32,
    generation: u64,
}

/// Accumulated results of a keyword search.
///
/// Pages are requested one at a time; the feed stops after the first empty
/// page. Responses for a replaced term are dropped.
#[derive(Debug, Clone)]
pub struct SearchFeed<T> {
    term: String,
    next_page: u32,
    results: Vec<T>,
    has_more: bool,
    loading: bool,
    generation: u64,
}

impl<T> Default for SearchFeed<T> {
    fn default() -> Self {
        Self {
            term: String::new(),
            next_page: 1,
            results: Vec::new(),
            has_more: false,
            loading: false,
            generation: 0,
        }
    }
}

impl<T> SearchFeed<T> {
    /// Creates a feed for `term`.
    #[must_use]
    pub fn new(term: &str) -> Self {
        let mut feed = Self::default();
        feed.reset(term);
        feed
    }

    /// Starts over with a new term.
    pub fn reset(&mut self, term: &str) {
        self.term = String::from(term.trim());
        self.next_page = 1;
        self.results.clear();
        self.has_more = !self.term.is_empty();
        self.loading = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Current term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Results so far.
    #[must_use]
    pub fn results(&self) -> &[T] {
        &self.results
    }

    /// Results so far, mutable.
    pub fn results_mut(&mut self) -> &mut [T] {
        &mut self.results
    }

    /// Whether another page may exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a page request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Claims the next page. `None` while loading or once exhausted.
    pub fn next_request(&mut self) -> Option<SearchRequest> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(SearchRequest {
            term: self.term.clone(),
            page: self.next_page,
            generation: self.generation,
        })
    }

    /// Appends a page of results.
    ///
    /// Returns `false` if the request belongs to a replaced term.
    pub fn apply(&mut self, request: &SearchRequest, results: Vec<T>) -> bool {
        if request.generation != self.generation {
            return false;
        }
        self.loading = false;
        if results.is_empty() {
            self.has_more = false;
        } else {
            self.results.extend(results);
            self.next_page = self.next_page.saturating_add(1);
        }
        true
    }

    /// Releases a failed request so the same page can be retried.
    pub fn fail(&mut self, request: &SearchRequest) {
        if request.generation == self.generation {
            self.loading = false;
        }
    }
}

impl SearchFeed<EnrichedMovie> {
    /// Fetches and enriches the next page.
    ///
    /// Returns the number of appended movies; `0` when nothing was requested,
    /// the feed is exhausted, or `cancel` fired.
    ///
    /// # Errors
    ///
    /// Returns an error if the search or enrichment fails.
    #[instrument(skip_all, fields(term = %self.term))]
    pub async fn load_next(
        &mut self,
        api: &(impl LocalMovieApi + LocalLikeApi + LocalPostApi + Sync),
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let Some(request) = self.next_request() else {
            return Ok(0);
        };

        let movies = match api.search(&request.term, request.page).await {
            Ok(movies) => movies,
            Err(err) => {
                self.fail(&request);
                return Err(err.context("검색 결과를 가져오는 중 오류가 발생했습니다"));
            }
        };

        let enriched =
            match enrich_movies(&PerMovieMetrics::new(api), session, movies, cancel).await {
                Ok(Some(enriched)) => enriched,
                Ok(None) => {
                    self.fail(&request);
                    return Ok(0);
                }
                Err(err) => {
                    self.fail(&request);
                    return Err(err);
                }
            };

        let count = enriched.len();
        self.apply(&request, enriched);
        tracing::debug!(page = request.page, count, "search page loaded");
        Ok(count)
    }
}
