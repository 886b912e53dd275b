//! Per-movie metric enrichment: like status, like count, average rating.
#![allow(clippy::future_not_send)]

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use filmlog_api::types::{Movie, MovieEntry, Post};
use filmlog_api::{LocalLikeApi, LocalMovieApi, LocalPostApi};
use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::rating::average_rating;
use crate::session::Session;

/// Derived fields of one movie, computed fresh on every load.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovieMetrics {
    /// Mean star rating of the movie's posts.
    pub average_rating: f64,
    /// Number of likes.
    pub likes_count: u64,
    /// Whether the viewer likes the movie (`false` when anonymous).
    pub user_has_liked: bool,
}

/// A movie with its derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMovie {
    /// Movie details.
    pub movie: Movie,
    /// Mean star rating of the movie's posts.
    pub average_rating: f64,
    /// Number of likes.
    pub likes_count: u64,
    /// Whether the viewer likes the movie.
    pub user_has_liked: bool,
}

impl EnrichedMovie {
    /// Attaches metrics to a movie.
    #[must_use]
    pub const fn new(movie: Movie, metrics: MovieMetrics) -> Self {
        Self {
            movie,
            average_rating: metrics.average_rating,
            likes_count: metrics.likes_count,
            user_has_liked: metrics.user_has_liked,
        }
    }
}

/// Source of per-movie metrics.
///
/// [`PerMovieMetrics`] issues one request wave per movie; a batched backend
/// query can replace it without touching callers.
#[trait_variant::make(MetricsSource: Send)]
pub trait LocalMetricsSource {
    /// Metrics of `movie_id` as seen by `member_no`.
    ///
    /// # Errors
    ///
    /// Returns an error if any underlying request fails.
    async fn metrics(&self, member_no: Option<u64>, movie_id: u64) -> Result<MovieMetrics>;
}

/// Fan-out metrics: status, then count, then posts, one movie at a time.
#[derive(Debug, Clone, Copy)]
pub struct PerMovieMetrics<'a, A> {
    api: &'a A,
}

impl<'a, A> PerMovieMetrics<'a, A> {
    /// Wraps a backend client.
    #[must_use]
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalLikeApi + LocalPostApi + Sync> LocalMetricsSource for PerMovieMetrics<'_, A> {
    async fn metrics(&self, member_no: Option<u64>, movie_id: u64) -> Result<MovieMetrics> {
        let (metrics, _posts) = fetch_metrics(self.api, member_no, movie_id).await?;
        Ok(metrics)
    }
}

/// Status, then count, then posts. The posts are handed back to the caller.
async fn fetch_metrics(
    api: &(impl LocalLikeApi + LocalPostApi + Sync),
    member_no: Option<u64>,
    movie_id: u64,
) -> Result<(MovieMetrics, Vec<Post>)> {
    let user_has_liked = match member_no {
        Some(member_no) => api
            .like_status(member_no, movie_id)
            .await
            .with_context(|| format!("like status failed for movie {movie_id}"))?,
        None => false,
    };
    let likes_count = api
        .like_count(movie_id)
        .await
        .with_context(|| format!("like count failed for movie {movie_id}"))?;
    let posts = api
        .posts_by_movie(movie_id)
        .await
        .with_context(|| format!("posts failed for movie {movie_id}"))?;

    let metrics = MovieMetrics {
        average_rating: average_rating(&posts),
        likes_count,
        user_has_liked,
    };
    Ok((metrics, posts))
}

/// Enriches one movie through the per-movie fan-out.
///
/// # Errors
///
/// Returns an error if any of the three requests fails.
pub async fn enrich_movie(
    api: &(impl LocalLikeApi + LocalPostApi + Sync),
    member_no: Option<u64>,
    movie: Movie,
) -> Result<EnrichedMovie> {
    let (entry, _posts) = enrich_movie_with_posts(api, member_no, movie).await?;
    Ok(entry)
}

/// Enriches one movie and returns the posts its average was computed from.
///
/// # Errors
///
/// Returns an error if any of the three requests fails.
pub async fn enrich_movie_with_posts(
    api: &(impl LocalLikeApi + LocalPostApi + Sync),
    member_no: Option<u64>,
    movie: Movie,
) -> Result<(EnrichedMovie, Vec<Post>)> {
    let (metrics, posts) = fetch_metrics(api, member_no, movie.id).await?;
    Ok((EnrichedMovie::new(movie, metrics), posts))
}

/// Enriches a batch of movies concurrently.
///
/// Each distinct movie id is fetched once. The batch fails as a whole when
/// any movie fails. Returns `Ok(None)` if `cancel` fires first.
///
/// # Errors
///
/// Returns the first metrics error of the batch.
#[instrument(skip_all, fields(count = movies.len()))]
pub async fn enrich_movies(
    source: &(impl LocalMetricsSource + Sync),
    session: &Session,
    movies: Vec<Movie>,
    cancel: &CancellationToken,
) -> Result<Option<Vec<EnrichedMovie>>> {
    let member_no = session.member_no();

    let mut seen = HashSet::new();
    let ids: Vec<u64> = movies
        .iter()
        .map(|movie| movie.id)
        .filter(|id| seen.insert(*id))
        .collect();

    let batch = try_join_all(ids.iter().map(|&id| source.metrics(member_no, id)));
    let results = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!("enrichment cancelled");
            return Ok(None);
        }
        results = batch => results.context("failed to enrich movies")?,
    };

    let metrics: HashMap<u64, MovieMetrics> = ids.into_iter().zip(results).collect();
    let enriched = movies
        .into_iter()
        .map(|movie| {
            let found = metrics.get(&movie.id).copied().unwrap_or_default();
            EnrichedMovie::new(movie, found)
        })
        .collect();
    Ok(Some(enriched))
}

/// Resolves list entries into full movies, fetching bare ids.
///
/// # Errors
///
/// Returns an error if any detail request fails.
#[instrument(skip_all, fields(count = entries.len()))]
pub async fn resolve_entries(
    api: &(impl LocalMovieApi + Sync),
    entries: Vec<MovieEntry>,
) -> Result<Vec<Movie>> {
    try_join_all(entries.into_iter().map(|entry| async move {
        match entry {
            MovieEntry::Movie(movie) => Ok(movie),
            MovieEntry::Id(id) => api
                .movie(id)
                .await
                .with_context(|| format!("failed to fetch movie {id}")),
        }
    }))
    .await
}

/// Resolves entries and enriches them in one step.
///
/// # Errors
///
/// Returns an error if resolving or enriching fails.
pub async fn load_movie_list(
    api: &(impl LocalMovieApi + LocalLikeApi + LocalPostApi + Sync),
    session: &Session,
    entries: Vec<MovieEntry>,
    cancel: &CancellationToken,
) -> Result<Option<Vec<EnrichedMovie>>> {
    let movies = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(None),
        movies = resolve_entries(api, entries) => movies?,
    };
    enrich_movies(&PerMovieMetrics::new(api), session, movies, cancel).await
}
