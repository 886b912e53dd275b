//! Tabular rendering of view models through `tracing`.

use filmlog_api::types::{Member, Post};
use filmlog_view::EnrichedMovie;
use filmlog_view::profile::ProfileView;
use filmlog_view::rating::{average_rating, format_rating, render_stars};

/// Logs one row per movie with its rating and like state.
pub fn render_movie_table(movies: &[EnrichedMovie]) {
    if movies.is_empty() {
        tracing::info!("No movies found.");
        return;
    }
    tracing::info!("ID\tRating\tLikes\tLiked\tReleased\tTitle");
    for entry in movies {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            entry.movie.id,
            format_rating(entry.average_rating),
            entry.likes_count,
            if entry.user_has_liked { "♥" } else { "-" },
            entry.movie.release_date.as_deref().unwrap_or("-"),
            entry.movie.title,
        );
    }
}

/// Logs a movie's details followed by its reviews.
pub fn render_movie_detail(entry: &EnrichedMovie, posts: &[Post], viewer: Option<u64>) {
    let movie = &entry.movie;
    tracing::info!("{} ({})", movie.title, movie.id);
    tracing::info!(
        "Released: {}",
        movie.release_date.as_deref().unwrap_or("-")
    );
    tracing::info!(
        "Runtime: {}",
        movie
            .runtime
            .map_or_else(|| String::from("-"), |minutes| format!("{minutes} min"))
    );
    tracing::info!(
        "Poster: {}",
        movie.poster_url().unwrap_or_else(|| String::from("-"))
    );
    tracing::info!(
        "Rating: {}\tLikes: {}{}",
        format_rating(entry.average_rating),
        entry.likes_count,
        if entry.user_has_liked { " ♥" } else { "" },
    );
    if let Some(overview) = movie.overview.as_deref().filter(|text| !text.is_empty()) {
        tracing::info!("{overview}");
    }
    render_posts(posts, viewer);
}

/// Logs reviews with star ratings; the viewer's own posts are marked.
pub fn render_posts(posts: &[Post], viewer: Option<u64>) {
    if posts.is_empty() {
        tracing::info!("No reviews yet.");
        return;
    }
    tracing::info!(
        "Reviews: {}\tAverage: {}",
        posts.len(),
        format_rating(average_rating(posts))
    );
    tracing::info!("PostID\tStars\tNick\tDate\tReview");
    for post in posts {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}{}",
            post.post_id,
            render_stars(post.rating_star),
            post.member_nick,
            post.reg_date,
            post.preview(),
            if post.is_owned_by(viewer) { "\t(mine)" } else { "" },
        );
    }
}

/// Logs a member's public details.
pub fn render_member(member: &Member) {
    tracing::info!("Member: {} (#{})", member.member_nick, member.member_no);
    if !member.member_email.is_empty() {
        tracing::info!("Email: {}", member.member_email);
    }
    if !member.member_phone.is_empty() {
        tracing::info!("Phone: {}", member.member_phone);
    }
}

/// Logs a loaded profile page.
pub fn render_profile(view: &ProfileView, viewer: Option<u64>) {
    render_member(&view.member);
    tracing::info!(
        "Image: {}",
        if view.image.is_placeholder() {
            filmlog_api::fallback::DEFAULT_PROFILE_IMAGE_PATH
        } else {
            "custom"
        }
    );
    tracing::info!("Liked movies: {}", view.liked_movies.len());
    for movie in &view.liked_movies {
        tracing::info!("{}\t{}", movie.id, movie.title);
    }
    render_posts(&view.posts, viewer);
}
