//! Member profile loading with cancellation.

use anyhow::{Context, Result};
use filmlog_api::fallback::{ProfileImage, posts_by_member_or_empty, profile_image_or_default};
use filmlog_api::types::{Member, Movie, Post};
use filmlog_api::{LocalMemberApi, LocalMovieApi, LocalPostApi};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::session::Session;

/// Everything a profile page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    /// Member details.
    pub member: Member,
    /// Posts written by the member.
    pub posts: Vec<Post>,
    /// Movies the member liked, in the backend's order.
    pub liked_movies: Vec<Movie>,
    /// Profile image or placeholder.
    pub image: ProfileImage,
}

/// Loads another member's profile by nickname.
///
/// Returns `Ok(None)` when the viewer is anonymous or `cancel` fires before
/// the view is complete.
///
/// # Errors
///
/// Returns an error if the member or their liked-movie list cannot be fetched.
#[instrument(skip_all, fields(nickname = %nickname))]
pub async fn load_other_profile(
    api: &(impl LocalMemberApi + LocalMovieApi + LocalPostApi + Sync),
    session: &Session,
    nickname: &str,
    cancel: &CancellationToken,
) -> Result<Option<ProfileView>> {
    if !viewer_is_member(session, cancel).await {
        return Ok(None);
    }
    let member = api
        .other_profile(nickname)
        .await
        .context("데이터 가져오기 실패")?;
    complete_profile(api, member, cancel).await
}

/// Loads the logged-in member's own profile.
///
/// Returns `Ok(None)` when the viewer is anonymous or `cancel` fires.
///
/// # Errors
///
/// Returns an error if the member or their liked-movie list cannot be fetched.
#[instrument(skip_all)]
pub async fn load_own_profile(
    api: &(impl LocalMemberApi + LocalMovieApi + LocalPostApi + Sync),
    session: &Session,
    cancel: &CancellationToken,
) -> Result<Option<ProfileView>> {
    if !viewer_is_member(session, cancel).await {
        return Ok(None);
    }
    let member = api.profile().await.context("데이터 가져오기 실패")?;
    complete_profile(api, member, cancel).await
}

/// Waits for the session to resolve; `false` when anonymous or cancelled.
async fn viewer_is_member(session: &Session, cancel: &CancellationToken) -> bool {
    let status = tokio::select! {
        biased;
        () = cancel.cancelled() => return false,
        status = session.resolved() => status,
    };
    status.member_no().is_some()
}

async fn complete_profile(
    api: &(impl LocalMemberApi + LocalMovieApi + LocalPostApi + Sync),
    member: Member,
    cancel: &CancellationToken,
) -> Result<Option<ProfileView>> {
    if cancel.is_cancelled() {
        return Ok(None);
    }
    let member_no = member.member_no;

    let (liked_ids, posts, image) = tokio::join!(
        api.liked_movies(member_no),
        posts_by_member_or_empty(api, member_no),
        profile_image_or_default(api, member_no),
    );
    let liked_ids = liked_ids.context("좋아요 누른 영화 가져오기 실패")?;
    if cancel.is_cancelled() {
        return Ok(None);
    }

    // Liked movies that fail to load are left out.
    let details = join_all(liked_ids.iter().map(|&id| api.movie(id))).await;
    let liked_movies = details
        .into_iter()
        .zip(liked_ids)
        .filter_map(|(result, id)| {
            result
                .inspect_err(|err| tracing::warn!(error = %err, movie_id = id, "skipping liked movie"))
                .ok()
        })
        .collect();
    if cancel.is_cancelled() {
        return Ok(None);
    }

    Ok(Some(ProfileView {
        member,
        posts,
        liked_movies,
        image,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{MockBackend, make_post};

    fn backend() -> MockBackend {
        MockBackend {
            liked: vec![278, 404, 238],
            missing_movies: vec![404],
            posts: vec![make_post(11, 278, 8, 5), make_post(12, 238, 8, 3)],
            image: Some(vec![1, 2, 3]),
            ..MockBackend::default()
        }
    }

    #[tokio::test]
    async fn test_anonymous_viewer_gets_nothing() {
        // Arrange
        let api = backend();
        let session = Session::new();
        session.set_anonymous();
        let cancel = CancellationToken::new();

        // Act
        let view = load_other_profile(&api, &session, "nachos", &cancel).await.unwrap();

        // Assert
        assert!(view.is_none());
        assert_eq!(api.other_profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_profile_collects_everything() {
        // Arrange
        let api = backend();
        let session = Session::new();
        session.set_authenticated(7);
        let cancel = CancellationToken::new();

        // Act
        let view = load_other_profile(&api, &session, "nachos", &cancel)
            .await
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(view.member.member_nick, "nachos");
        assert_eq!(view.posts.len(), 2);
        assert_eq!(
            view.liked_movies.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![278, 238]
        );
        assert_eq!(view.image, ProfileImage::Custom(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_cancelled_load_returns_none() {
        // Arrange
        let api = backend();
        let session = Session::new();
        session.set_authenticated(7);
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Act
        let view = load_own_profile(&api, &session, &cancel).await.unwrap();

        // Assert
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn test_cancel_while_session_unresolved_returns_none() {
        // Arrange
        let api = backend();
        let session = Session::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Act
        let own = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            load_own_profile(&api, &session, &cancel),
        )
        .await
        .unwrap()
        .unwrap();
        let other = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            load_other_profile(&api, &session, "nachos", &cancel),
        )
        .await
        .unwrap()
        .unwrap();

        // Assert
        assert!(own.is_none());
        assert!(other.is_none());
        assert_eq!(api.other_profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_own_profile_with_placeholder_image() {
        // Arrange
        let api = MockBackend {
            image: None,
            ..backend()
        };
        let session = Session::new();
        session.set_authenticated(7);
        let cancel = CancellationToken::new();

        // Act
        let view = load_own_profile(&api, &session, &cancel).await.unwrap().unwrap();

        // Assert
        assert_eq!(view.member.member_no, 7);
        assert!(view.image.is_placeholder());
    }
}
