//! Review rating aggregation and display.

use filmlog_api::types::{MAX_RATING_STAR, Post};

/// Unweighted mean of the star ratings, `0.0` for no posts.
#[must_use]
pub fn average_rating(posts: &[Post]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let total = posts
        .iter()
        .map(|post| u32::from(post.rating_star))
        .fold(0_u32, u32::saturating_add);
    #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
    let count = posts.len() as f64;
    f64::from(total) / count
}

/// Formats an average for display: one decimal when positive, `"0"` otherwise.
#[must_use]
pub fn format_rating(rating: f64) -> String {
    if rating > 0.0 {
        format!("{rating:.1}")
    } else {
        String::from("0")
    }
}

/// Renders a star rating as filled and empty stars (`★★★☆☆`).
#[must_use]
pub fn render_stars(rating_star: u8) -> String {
    let filled = rating_star.min(MAX_RATING_STAR);
    let empty = MAX_RATING_STAR.saturating_sub(filled);
    format!(
        "{}{}",
        "★".repeat(usize::from(filled)),
        "☆".repeat(usize::from(empty))
    )
}
