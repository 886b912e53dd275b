//! API client library for filmlog.
//!
//! Typed access to the movie review backend: members, movies, posts, and
//! likes, behind one cookie-carrying HTTP client.

/// Service traits.
pub mod api;
/// HTTP client with the session interceptor.
pub mod client;
/// Error taxonomy.
pub mod error;
/// Default-on-failure read helpers.
pub mod fallback;
/// Wire types.
pub mod types;

pub use api::{
    AuthApi, LikeApi, LocalAuthApi, LocalLikeApi, LocalMemberApi, LocalMovieApi, LocalPostApi,
    MemberApi, MovieApi, PostApi,
};
pub use client::{FilmlogClient, FilmlogClientBuilder, SessionHook};
pub use error::ApiError;
