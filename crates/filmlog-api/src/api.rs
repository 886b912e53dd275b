//! Service traits, one per backend resource.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use crate::types::{
    ApiMessage, AuthCheck, LikeUpdate, Member, MemberMessage, MemberUpdate, Movie, MovieEntry,
    MovieImage, NewPost, Post, SocialJoinForm, Video,
};

/// Session endpoints (`login`, `member/logout`, `member/check_auth`).
///
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(AuthApi: Send)]
pub trait LocalAuthApi {
    /// Logs in; the backend answers with a session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error on bad credentials or transport failure.
    async fn login(&self, username: &str, password: &str) -> Result<serde_json::Value>;

    /// Ends the server-side session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn logout(&self) -> Result<()>;

    /// Validates the session cookie and returns the logged-in member.
    ///
    /// # Errors
    ///
    /// Returns an error when no valid session exists.
    async fn check_auth(&self) -> Result<AuthCheck>;

    /// Asks the backend to reissue the access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is missing or expired.
    async fn refresh_token(&self) -> Result<serde_json::Value>;
}

/// Member endpoints.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MemberApi: Send)]
pub trait LocalMemberApi {
    /// Fetches the logged-in member.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn profile(&self) -> Result<Member>;

    /// Updates the logged-in member.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    async fn update_member(&self, update: &MemberUpdate) -> Result<MemberMessage>;

    /// Returns `true` if `nickname` is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn check_nickname(&self, nickname: &str) -> Result<bool>;

    /// Returns `true` if `password` matches the logged-in member.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn verify_password(&self, password: &str) -> Result<bool>;

    /// Fetches another member by nickname.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn other_profile(&self, nickname: &str) -> Result<Member>;

    /// Completes registration of a member who signed in through a social provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the form.
    async fn social_join(&self, form: &SocialJoinForm) -> Result<MemberMessage>;

    /// Deletes a member account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion.
    async fn delete_member(&self, member_no: u64) -> Result<ApiMessage>;

    /// Reads a member's profile image. `None` when the member has none (404).
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than 404.
    async fn member_image(&self, member_no: u64) -> Result<Option<Vec<u8>>>;

    /// Deletes a member's profile image.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn delete_member_image(&self, member_no: u64) -> Result<()>;
}

/// Movie endpoints.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieApi: Send)]
pub trait LocalMovieApi {
    /// Movies currently in theaters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn now_playing(&self) -> Result<Vec<MovieEntry>>;

    /// Highest-rated movies.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn top_rated(&self) -> Result<Vec<MovieEntry>>;

    /// Most-liked movies.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn top_liked(&self) -> Result<Vec<MovieEntry>>;

    /// Movie details.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn movie(&self, movie_id: u64) -> Result<Movie>;

    /// Videos attached to a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn videos(&self, movie_id: u64) -> Result<Vec<Video>>;

    /// Still images of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn images(&self, movie_id: u64) -> Result<Vec<MovieImage>>;

    /// Ids of the movies a member liked.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn liked_movies(&self, member_no: u64) -> Result<Vec<u64>>;

    /// One page of keyword search results (pages start at 1).
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn search(&self, keyword: &str, page: u32) -> Result<Vec<Movie>>;
}

/// Post (review) endpoints.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(PostApi: Send)]
pub trait LocalPostApi {
    /// All posts for a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn posts_by_movie(&self, movie_id: u64) -> Result<Vec<Post>>;

    /// All posts written by a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn posts_by_member(&self, member_no: u64) -> Result<Vec<Post>>;

    /// Server-computed average rating.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn average_rating(&self, movie_id: u64) -> Result<f64>;

    /// Registers a new post.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the post.
    async fn register_post(&self, post: &NewPost) -> Result<()>;

    /// Deletes a post (owner only, enforced server-side).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion.
    async fn delete_post(&self, post_id: u64) -> Result<()>;
}

/// Like endpoints.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(LikeApi: Send)]
pub trait LocalLikeApi {
    /// Whether `member_no` likes `movie_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn like_status(&self, member_no: u64, movie_id: u64) -> Result<bool>;

    /// Number of likes on a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON decoding fails.
    async fn like_count(&self, movie_id: u64) -> Result<u64>;

    /// Sets the like state of a (member, movie) pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    async fn update_like(&self, update: &LikeUpdate) -> Result<()>;
}
