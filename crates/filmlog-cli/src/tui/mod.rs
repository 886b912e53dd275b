//! Interactive terminal browser.
//!
//! Uses `ratatui` + `crossterm` for rendering. Backend calls run on the
//! current task between frames.

/// Browser state types.
pub mod state;
mod ui;

use std::io;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use filmlog_api::fallback::posts_by_movie_or_empty;
use filmlog_api::{LocalLikeApi, LocalPostApi};
use filmlog_view::likes::{LikeOutcome, toggle_like};
use filmlog_view::{EnrichedMovie, Session};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use self::state::{ActivePane, BrowseState};

/// Action requested by a key press that needs the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseAction {
    /// Leave the browser.
    Quit,
    /// Flip the like on the selected movie.
    ToggleLike,
    /// Delete the selected review.
    DeletePost,
}

/// Runs the browser TUI over an enriched now-playing list.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
#[allow(clippy::future_not_send)]
pub async fn run_browser(
    api: &(impl LocalLikeApi + LocalPostApi + Sync),
    session: &Session,
    movies: Vec<EnrichedMovie>,
    page_size: usize,
) -> Result<()> {
    let mut state = BrowseState::new(movies, session.member_no(), page_size)?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut state, api, session).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
#[allow(clippy::future_not_send)]
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut BrowseState,
    api: &(impl LocalLikeApi + LocalPostApi + Sync),
    session: &Session,
) -> Result<()> {
    loop {
        state.viewer = session.member_no();
        if let Some(movie_id) = state.stale_posts_movie() {
            let posts = posts_by_movie_or_empty(api, movie_id).await;
            state.set_posts(movie_id, posts);
        }

        terminal
            .draw(|frame| ui::draw(frame, state))
            .context("failed to draw TUI")?;

        if event::poll(std::time::Duration::from_millis(100)).context("failed to poll events")?
            && let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
        {
            match handle_normal_input(state, key.code, key.modifiers) {
                Some(BrowseAction::Quit) => return Ok(()),
                Some(BrowseAction::ToggleLike) => toggle_selected_like(api, session, state).await,
                Some(BrowseAction::DeletePost) => delete_selected_post(api, session, state).await,
                None => {}
            }
        }
    }
}

/// Handles key input. Returns the backend action to run, if any.
fn handle_normal_input(
    state: &mut BrowseState,
    key: KeyCode,
    modifiers: KeyModifiers,
) -> Option<BrowseAction> {
    state.status = None;
    match key {
        KeyCode::Char('q') => return Some(BrowseAction::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(BrowseAction::Quit);
        }
        KeyCode::Up | KeyCode::Char('k') => state.move_up(),
        KeyCode::Down | KeyCode::Char('j') => state.move_down(),
        KeyCode::Left => state.prev_page(),
        KeyCode::Right => state.next_page(),
        KeyCode::Tab => state.toggle_pane(),
        KeyCode::Char(' ') if state.active_pane == ActivePane::Movies => {
            return Some(BrowseAction::ToggleLike);
        }
        KeyCode::Char('d') if state.active_pane == ActivePane::Posts => {
            return Some(BrowseAction::DeletePost);
        }
        _ => {}
    }
    None
}

/// Toggles the like on the selected movie and reports the outcome.
#[allow(clippy::future_not_send)]
async fn toggle_selected_like(
    api: &(impl LocalLikeApi + Sync),
    session: &Session,
    state: &mut BrowseState,
) {
    let Some(movie) = state.current_movie_mut() else {
        return;
    };
    let message = match toggle_like(api, session, movie).await {
        Ok(LikeOutcome::NotLoggedIn) => String::from("You must be logged in to like a movie."),
        Ok(LikeOutcome::Liked) => format!("Liked {}", movie.movie.title),
        Ok(LikeOutcome::Unliked) => format!("Unliked {}", movie.movie.title),
        Err(err) => format!("{err:#}"),
    };
    state.set_status(message);
}

/// Deletes the selected review if the viewer wrote it.
#[allow(clippy::future_not_send)]
async fn delete_selected_post(
    api: &(impl LocalPostApi + Sync),
    session: &Session,
    state: &mut BrowseState,
) {
    let Some(post) = state.current_post() else {
        return;
    };
    if !post.is_owned_by(session.member_no()) {
        state.set_status("Only your own reviews can be deleted.");
        return;
    }
    let post_id = post.post_id;
    match api.delete_post(post_id).await {
        Ok(()) => {
            state.remove_post(post_id);
            state.set_status("Review deleted.");
        }
        Err(err) => {
            tracing::error!(error = %err, post_id, "failed to delete post");
            state.set_status(format!("{err:#}"));
        }
    }
}
