//! Read helpers that degrade to a default instead of failing.
//!
//! Screens that only display data use these. Flows that must see the
//! failure (enrichment, form submission) call the service traits directly.

use anyhow::Result;
use rand::seq::IndexedRandom;
use tracing::instrument;

use crate::api::{LocalMemberApi, LocalMovieApi, LocalPostApi};
use crate::types::{Post, Video};

/// Image shown for members without a profile picture.
pub const DEFAULT_PROFILE_IMAGE_PATH: &str = "/profile/basic.png";

/// A member's profile image, or the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileImage {
    /// Uploaded image bytes.
    Custom(Vec<u8>),
    /// No usable image; render [`DEFAULT_PROFILE_IMAGE_PATH`].
    Placeholder,
}

impl ProfileImage {
    /// Whether the placeholder should be rendered.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// Posts for a movie, or an empty list on failure.
#[instrument(skip_all)]
pub async fn posts_by_movie_or_empty(api: &(impl LocalPostApi + Sync), movie_id: u64) -> Vec<Post> {
    match api.posts_by_movie(movie_id).await {
        Ok(posts) => posts,
        Err(err) => {
            tracing::error!(error = %err, movie_id, "Error fetching posts by movie ID");
            Vec::new()
        }
    }
}

/// Posts by a member, or an empty list on failure.
#[instrument(skip_all)]
pub async fn posts_by_member_or_empty(
    api: &(impl LocalPostApi + Sync),
    member_no: u64,
) -> Vec<Post> {
    match api.posts_by_member(member_no).await {
        Ok(posts) => posts,
        Err(err) => {
            tracing::error!(error = %err, member_no, "Error getting posts by memberNo");
            Vec::new()
        }
    }
}

/// Nickname duplicate check; `false` when the check itself fails.
#[instrument(skip_all)]
pub async fn nickname_duplicate_or_false(api: &(impl LocalMemberApi + Sync), nickname: &str) -> bool {
    api.check_nickname(nickname)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "nickname check failed"))
        .unwrap_or(false)
}

/// Password verification; `false` when the check itself fails.
#[instrument(skip_all)]
pub async fn password_valid_or_false(api: &(impl LocalMemberApi + Sync), password: &str) -> bool {
    api.verify_password(password)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "password verification failed"))
        .unwrap_or(false)
}

/// Profile image, falling back to the placeholder on 404, empty body, or error.
#[instrument(skip_all)]
pub async fn profile_image_or_default(
    api: &(impl LocalMemberApi + Sync),
    member_no: u64,
) -> ProfileImage {
    match api.member_image(member_no).await {
        Ok(Some(bytes)) if !bytes.is_empty() => ProfileImage::Custom(bytes),
        Ok(_) => ProfileImage::Placeholder,
        Err(err) => {
            tracing::error!(error = %err, member_no, "failed to load profile image");
            ProfileImage::Placeholder
        }
    }
}

/// Deletes a member's profile image, logging instead of failing.
#[instrument(skip_all)]
pub async fn delete_member_image_quietly(api: &(impl LocalMemberApi + Sync), member_no: u64) {
    match api.delete_member_image(member_no).await {
        Ok(()) => tracing::info!(member_no, "deleted previous profile image"),
        Err(err) => tracing::error!(error = %err, member_no, "failed to delete profile image"),
    }
}

/// Picks one of a movie's videos at random.
///
/// `Ok(None)` when the movie has no videos.
///
/// # Errors
///
/// Returns an error if the videos request fails.
#[instrument(skip_all)]
pub async fn random_trailer(api: &(impl LocalMovieApi + Sync), movie_id: u64) -> Result<Option<Video>> {
    let videos = api
        .videos(movie_id)
        .await
        .inspect_err(|err| tracing::error!(error = %err, movie_id, "trailer request failed"))?;
    Ok(videos.choose(&mut rand::rng()).cloned())
}
