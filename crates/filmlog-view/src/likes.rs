//! Like toggling with post-confirmation local update.

use anyhow::{Context, Result};
use filmlog_api::LocalLikeApi;
use filmlog_api::types::LikeUpdate;
use tracing::instrument;

use crate::enrich::EnrichedMovie;
use crate::session::Session;

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// No viewer is logged in; nothing was sent.
    NotLoggedIn,
    /// The movie is now liked.
    Liked,
    /// The movie is no longer liked.
    Unliked,
}

/// Flips the viewer's like on `movie`.
///
/// The local flag and count change only after the backend accepts the
/// update, by exactly one in either direction.
///
/// # Errors
///
/// Returns an error if the update request fails; `movie` is left untouched.
#[instrument(skip_all, fields(movie_id = movie.movie.id))]
pub async fn toggle_like(
    api: &(impl LocalLikeApi + Sync),
    session: &Session,
    movie: &mut EnrichedMovie,
) -> Result<LikeOutcome> {
    let Some(member_no) = session.member_no() else {
        tracing::warn!("You must be logged in to like a movie.");
        return Ok(LikeOutcome::NotLoggedIn);
    };

    let liked = !movie.user_has_liked;
    let update = LikeUpdate {
        member_no,
        movie_id: movie.movie.id,
        liked,
    };
    api.update_like(&update)
        .await
        .context("Error updating like status")?;

    movie.user_has_liked = liked;
    if liked {
        movie.likes_count = movie.likes_count.saturating_add(1);
        Ok(LikeOutcome::Liked)
    } else {
        movie.likes_count = movie.likes_count.saturating_sub(1);
        Ok(LikeOutcome::Unliked)
    }
}
