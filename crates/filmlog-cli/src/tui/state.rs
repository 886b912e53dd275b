//! Browser TUI state management.

use anyhow::Result;
use filmlog_api::types::Post;
use filmlog_view::EnrichedMovie;
use filmlog_view::carousel::Carousel;
use filmlog_view::paging::IncrementalList;
use ratatui::widgets::TableState;

/// Currently focused pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    /// Movie carousel (top).
    Movies,
    /// Review list of the selected movie (bottom).
    Posts,
}

/// State for the browser TUI.
#[allow(clippy::module_name_repetitions)]
pub struct BrowseState {
    /// Now-playing movies, one carousel page at a time.
    pub carousel: Carousel<EnrichedMovie>,
    /// Currently focused pane.
    pub active_pane: ActivePane,
    /// Table state for the carousel window.
    pub movie_table_state: TableState,
    /// Table state for the review list.
    pub post_table_state: TableState,
    /// Logged-in member, if any.
    pub viewer: Option<u64>,
    /// One-line message shown in the footer.
    pub status: Option<String>,
    posts: IncrementalList<Post>,
    posts_movie_id: Option<u64>,
}

impl BrowseState {
    /// Creates a new state with the first movie selected.
    ///
    /// # Errors
    ///
    /// Returns an error if `page_size` is 0.
    pub fn new(movies: Vec<EnrichedMovie>, viewer: Option<u64>, page_size: usize) -> Result<Self> {
        let carousel = Carousel::new(movies);
        let mut movie_table_state = TableState::default();
        if !carousel.window().is_empty() {
            movie_table_state.select(Some(0));
        }
        Ok(Self {
            carousel,
            active_pane: ActivePane::Movies,
            movie_table_state,
            post_table_state: TableState::default(),
            viewer,
            status: None,
            posts: IncrementalList::new(Vec::new(), page_size)?,
            posts_movie_id: None,
        })
    }

    /// Returns the movie cursor position within the carousel window.
    #[must_use]
    pub fn movie_cursor(&self) -> usize {
        self.movie_table_state.selected().unwrap_or(0)
    }

    /// Returns the review cursor position.
    #[must_use]
    pub fn post_cursor(&self) -> usize {
        self.post_table_state.selected().unwrap_or(0)
    }

    /// Returns the selected movie.
    #[must_use]
    pub fn current_movie(&self) -> Option<&EnrichedMovie> {
        self.carousel.window().get(self.movie_cursor())
    }

    /// Returns the selected movie for in-place updates.
    pub fn current_movie_mut(&mut self) -> Option<&mut EnrichedMovie> {
        let cursor = self.movie_cursor();
        self.carousel.window_mut().get_mut(cursor)
    }

    /// Returns the selected review.
    #[must_use]
    pub fn current_post(&self) -> Option<&Post> {
        self.post_table_state
            .selected()
            .and_then(|idx| self.posts.visible().get(idx))
    }

    /// Reviews currently rendered.
    #[must_use]
    pub fn visible_posts(&self) -> &[Post] {
        self.posts.visible()
    }

    /// Whether more reviews are hidden behind the sentinel row.
    #[must_use]
    pub fn has_more_posts(&self) -> bool {
        self.posts.has_more()
    }

    /// Total number of loaded reviews.
    #[must_use]
    pub fn total_posts(&self) -> usize {
        self.posts.len()
    }

    /// Movie id whose reviews need (re)loading, if the selection moved.
    #[must_use]
    pub fn stale_posts_movie(&self) -> Option<u64> {
        let movie_id = self.current_movie()?.movie.id;
        (self.posts_movie_id != Some(movie_id)).then_some(movie_id)
    }

    /// Replaces the review list with the reviews of `movie_id`.
    pub fn set_posts(&mut self, movie_id: u64, posts: Vec<Post>) {
        self.posts.reset(posts);
        self.posts_movie_id = Some(movie_id);
        self.post_table_state
            .select(if self.posts.is_empty() { None } else { Some(0) });
    }

    /// Drops a deleted review and keeps the cursor in range.
    pub fn remove_post(&mut self, post_id: u64) {
        if self.posts.remove_where(|post| post.post_id == post_id) == 0 {
            return;
        }
        let visible = self.posts.visible_len();
        if visible == 0 {
            self.post_table_state.select(None);
        } else if self.post_cursor() >= visible {
            self.post_table_state.select(Some(visible.saturating_sub(1)));
        }
    }

    /// Shows the next carousel page.
    pub fn next_page(&mut self) {
        if self.carousel.next_page() {
            self.movie_table_state.select(Some(0));
        }
    }

    /// Shows the previous carousel page.
    pub fn prev_page(&mut self) {
        if self.carousel.prev_page() {
            self.movie_table_state.select(Some(0));
        }
    }

    /// Moves cursor up in the active pane.
    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Movies => {
                let cursor = self.movie_cursor();
                if cursor > 0 {
                    self.movie_table_state.select(Some(cursor.saturating_sub(1)));
                }
            }
            ActivePane::Posts => {
                let cursor = self.post_cursor();
                if cursor > 0 {
                    self.post_table_state.select(Some(cursor.saturating_sub(1)));
                }
            }
        }
    }

    /// Moves cursor down in the active pane.
    ///
    /// Stepping onto the sentinel row below the last review reveals the next
    /// page of reviews.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Movies => {
                let next = self.movie_cursor() + 1;
                if next < self.carousel.window().len() {
                    self.movie_table_state.select(Some(next));
                }
            }
            ActivePane::Posts => {
                let next = self.post_cursor() + 1;
                let visible = self.posts.visible_len();
                if next < visible {
                    self.post_table_state.select(Some(next));
                } else if next == visible && self.posts.has_more() {
                    let sentinel = self.posts.sentinel();
                    if self.posts.on_intersect(sentinel) {
                        self.post_table_state.select(Some(next));
                    }
                }
            }
        }
    }

    /// Switches focus between the two panes.
    pub const fn toggle_pane(&mut self) {
        self.active_pane = match self.active_pane {
            ActivePane::Movies => ActivePane::Posts,
            ActivePane::Posts => ActivePane::Movies,
        };
    }

    /// Sets the footer message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}
