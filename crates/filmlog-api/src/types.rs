//! Request and response shapes of the movie review backend.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Base URL for TMDB poster images (w300 size).
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w300/";

/// Lowest star rating a review may carry.
pub const MIN_RATING_STAR: u8 = 1;

/// Highest star rating a review may carry.
pub const MAX_RATING_STAR: u8 = 5;

// --- Members ---

/// A registered member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Member number (primary key).
    pub member_no: u64,
    /// Login e-mail.
    #[serde(default)]
    pub member_email: String,
    /// Real name.
    #[serde(default)]
    pub member_name: String,
    /// Phone number.
    #[serde(default)]
    pub member_phone: String,
    /// Public nickname.
    #[serde(default)]
    pub member_nick: String,
}

/// Payload for `PUT member/update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    /// Member number being edited.
    pub member_no: u64,
    /// New nickname.
    pub member_nick: String,
    /// New phone number.
    pub member_phone: String,
    /// Current password, verified beforehand through `member/verifyPw`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    /// Replacement password, if changing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

/// Payload for `PUT member/socialJoin`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialJoinForm {
    /// E-mail from the social provider (read-only in the form).
    pub member_email: String,
    /// Real name.
    pub member_name: String,
    /// Phone number.
    pub member_phone: String,
    /// Chosen nickname.
    pub member_nick: String,
}

/// Body of `POST login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Login id (e-mail).
    pub username: String,
    /// Plain password.
    pub password: String,
}

/// Response of `GET member/check_auth`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheck {
    /// Logged-in member number.
    pub member_no: u64,
    /// Logged-in nickname, when the backend includes it.
    #[serde(default)]
    pub member_nick: Option<String>,
}

/// Generic `{ "message": ... }` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    /// Human-readable result message.
    #[serde(default)]
    pub message: String,
}

/// Response of member update and social join.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberMessage {
    /// Human-readable result message.
    #[serde(default)]
    pub message: String,
    /// Member after the change.
    pub member: Option<Member>,
}

/// Response of `GET member/checkNickname`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicknameCheck {
    /// Whether the nickname is already taken.
    pub is_duplicate: bool,
}

/// Response of `POST member/verifyPw`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCheck {
    /// Whether the password matches the logged-in member.
    pub is_valid: bool,
}

/// Error body returned by the backend on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Message field used by the auth filter.
    #[serde(default)]
    pub msg: Option<String>,
    /// Message field used by controllers.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Returns whichever message field is present.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.msg.as_deref().or(self.message.as_deref())
    }
}

// --- Movies ---

/// A movie as returned by the movie endpoints (TMDB-backed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Poster path relative to the TMDB image CDN.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default)]
    pub release_date: Option<String>,
    /// TMDB vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
}

impl Movie {
    /// Full poster URL, if the movie has a poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{POSTER_BASE_URL}{}", path.trim_start_matches('/')))
    }
}

/// An element of a movie list endpoint.
///
/// `now_playing` returns full movie objects while `top_rated` returns bare
/// ids that must be resolved through `movies/:id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MovieEntry {
    /// Bare TMDB id.
    Id(u64),
    /// Full movie object.
    Movie(Movie),
}

impl MovieEntry {
    /// TMDB id of the entry.
    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::Id(id) => *id,
            Self::Movie(movie) => movie.id,
        }
    }
}

/// A video (trailer, teaser) attached to a movie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    /// Provider-specific key (YouTube id).
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Hosting site (e.g. "YouTube").
    #[serde(default)]
    pub site: String,
    /// Video type (e.g. "Trailer").
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl Video {
    /// Watch URL for YouTube-hosted videos.
    #[must_use]
    pub fn watch_url(&self) -> Option<String> {
        (self.site == "YouTube").then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }
}

/// A still or backdrop image of a movie.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieImage {
    /// Image path relative to the TMDB image CDN.
    pub file_path: String,
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
}

// --- Posts ---

/// A star-rated review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post ID.
    pub post_id: u64,
    /// Author member number.
    pub member_no: u64,
    /// Author nickname.
    #[serde(default)]
    pub member_nick: String,
    /// Reviewed movie.
    pub movie_id: u64,
    /// Star rating (1-5).
    pub rating_star: u8,
    /// Free-text review.
    #[serde(default)]
    pub post_content: Option<String>,
    /// Registration date as sent by the backend.
    #[serde(default)]
    pub reg_date: String,
}

impl Post {
    /// Whether `member_no` wrote this post (delete control gate).
    #[must_use]
    pub const fn is_owned_by(&self, member_no: Option<u64>) -> bool {
        matches!(member_no, Some(no) if no == self.member_no)
    }

    /// First line of the content, shown while the post is collapsed.
    #[must_use]
    pub fn preview(&self) -> &str {
        self.post_content
            .as_deref()
            .and_then(|content| content.lines().next())
            .unwrap_or("")
    }
}

/// Body of `POST posts/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    /// Review text.
    pub post_content: String,
    /// Star rating (1-5).
    pub rating_star: u8,
    /// Reviewed movie.
    pub movie_id: u64,
    /// Author nickname.
    pub member_nick: String,
}

impl NewPost {
    /// Creates a post payload, rejecting ratings outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if `rating_star` is out of range.
    pub fn new(
        content: impl Into<String>,
        rating_star: u8,
        movie_id: u64,
        member_nick: impl Into<String>,
    ) -> Result<Self, ApiError> {
        if !(MIN_RATING_STAR..=MAX_RATING_STAR).contains(&rating_star) {
            return Err(ApiError::Validation(format!(
                "rating must be between {MIN_RATING_STAR} and {MAX_RATING_STAR}, got {rating_star}"
            )));
        }
        Ok(Self {
            post_content: content.into(),
            rating_star,
            movie_id,
            member_nick: member_nick.into(),
        })
    }
}

// --- Likes ---

/// Body of `POST likes/update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeUpdate {
    /// Member toggling the like.
    pub member_no: u64,
    /// Target movie.
    pub movie_id: u64,
    /// New like state.
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_parse_member_fixture() {
        // Arrange
        let json = include_str!("../../../fixtures/api/member_profile.json");

        // Act
        let member: Member = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(member.member_no, 7);
        assert_eq!(member.member_nick, "popcorn");
    }

    #[test]
    fn test_parse_now_playing_fixture() {
        // Arrange
        let json = include_str!("../../../fixtures/api/now_playing.json");

        // Act
        let entries: Vec<MovieEntry> = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], MovieEntry::Movie(_)));
        assert_eq!(entries[0].id(), 1_022_789);
    }

    #[test]
    fn test_parse_top_rated_ids() {
        // Arrange
        let json = include_str!("../../../fixtures/api/top_rated.json");

        // Act
        let entries: Vec<MovieEntry> = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(entries, vec![MovieEntry::Id(278), MovieEntry::Id(238), MovieEntry::Id(240)]);
    }

    #[test]
    fn test_parse_posts_fixture() {
        // Arrange
        let json = include_str!("../../../fixtures/api/posts_movie_278.json");

        // Act
        let posts: Vec<Post> = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].rating_star, 5);
        assert_eq!(posts[1].post_content, None);
    }

    #[test]
    fn test_poster_url() {
        // Arrange
        let json = include_str!("../../../fixtures/api/movie_278.json");
        let movie: Movie = serde_json::from_str(json).unwrap();

        // Act
        let url = movie.poster_url().unwrap();

        // Assert
        assert_eq!(movie.runtime, Some(142));
        assert_eq!(url, "https://image.tmdb.org/t/p/w300/q6y0Go1tsGEsmtFryDOJo3dEmqu.jpg");
    }

    #[test]
    fn test_new_post_rejects_out_of_range_rating() {
        // Arrange & Act
        let zero = NewPost::new("meh", 0, 278, "popcorn");
        let six = NewPost::new("wow", 6, 278, "popcorn");
        let five = NewPost::new("wow", 5, 278, "popcorn");

        // Assert
        assert!(matches!(zero, Err(ApiError::Validation(_))));
        assert!(matches!(six, Err(ApiError::Validation(_))));
        assert!(five.is_ok());
    }

    #[test]
    fn test_new_post_serializes_camel_case() {
        // Arrange
        let post = NewPost::new("Great", 4, 278, "popcorn").unwrap();

        // Act
        let json = serde_json::to_value(&post).unwrap();

        // Assert
        assert_eq!(json["postContent"], "Great");
        assert_eq!(json["ratingStar"], 4);
        assert_eq!(json["movieId"], 278);
        assert_eq!(json["memberNick"], "popcorn");
    }

    #[test]
    fn test_post_preview_and_owner() {
        // Arrange
        let post = Post {
            post_id: 1,
            member_no: 7,
            member_nick: String::from("popcorn"),
            movie_id: 278,
            rating_star: 5,
            post_content: Some(String::from("First line\nSecond line")),
            reg_date: String::from("2024-09-01"),
        };

        // Act & Assert
        assert_eq!(post.preview(), "First line");
        assert!(post.is_owned_by(Some(7)));
        assert!(!post.is_owned_by(Some(8)));
        assert!(!post.is_owned_by(None));
    }

    #[test]
    fn test_error_body_prefers_msg() {
        // Arrange
        let body: ErrorBody =
            serde_json::from_str(r#"{"msg":"블랙리스트 토큰","message":"other"}"#).unwrap();

        // Act & Assert
        assert_eq!(body.text(), Some("블랙리스트 토큰"));
    }

    #[test]
    fn test_video_watch_url() {
        // Arrange
        let video: Video =
            serde_json::from_str(r#"{"key":"abc123","name":"Trailer","site":"YouTube","type":"Trailer"}"#)
                .unwrap();

        // Act & Assert
        assert_eq!(video.kind, "Trailer");
        assert_eq!(
            video.watch_url().as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
    }
}
