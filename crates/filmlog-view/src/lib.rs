//! View-model library for filmlog.
//!
//! Holds what the pages of the front end compute between the backend and
//! the screen: the session, incremental lists, search paging, per-movie
//! enrichment, the carousel, likes, the nickname gate, and profiles.

/// Carousel paging.
pub mod carousel;
/// Per-movie metric enrichment.
pub mod enrich;
/// Like toggling.
pub mod likes;
/// Nickname duplicate gate and member forms.
pub mod nickname;
/// Incremental list rendering.
pub mod paging;
/// Profile loading.
pub mod profile;
/// Rating aggregation and display.
pub mod rating;
/// Keyword search feed.
pub mod search;
/// Session context.
pub mod session;

#[cfg(test)]
mod testing;

pub use enrich::EnrichedMovie;
pub use session::{AuthStatus, Session};
