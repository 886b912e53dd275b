//! TUI rendering logic for the browser.

use filmlog_view::rating::{format_rating, render_stars};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};

use super::state::{ActivePane, BrowseState};

/// Border style for a pane, highlighted when focused.
fn pane_border(state: &BrowseState, pane: ActivePane) -> Style {
    if state.active_pane == pane {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Draws the browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &mut BrowseState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(9), // carousel window
            Constraint::Min(5),    // reviews
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], state);
    draw_carousel(frame, chunks[1], state);
    draw_posts(frame, chunks[2], state);
    draw_footer(frame, chunks[3], state);
}

/// Draws the header with carousel position and login state.
fn draw_header(frame: &mut Frame, area: Rect, state: &BrowseState) {
    let carousel = &state.carousel;
    let arrows = format!(
        "{}{}",
        if carousel.has_prev() { "\u{25c0}" } else { " " },
        if carousel.has_next() { "\u{25b6}" } else { " " },
    );
    let viewer = state
        .viewer
        .map_or_else(|| String::from("anonymous"), |no| format!("member #{no}"));
    let text = format!(
        "{arrows}  page {}/{}  offset {}px  {} movies  |  {viewer}",
        carousel.page().saturating_add(1),
        carousel.page_count().max(1),
        carousel.offset_px(),
        carousel.items().len(),
    );
    let header =
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Now Playing "));
    frame.render_widget(header, area);
}

/// Draws the visible carousel page.
fn draw_carousel(frame: &mut Frame, area: Rect, state: &mut BrowseState) {
    let header = Row::new(vec!["Title", "Rating", "Likes", "", "Released"])
        .style(header_style())
        .bottom_margin(1);

    let rows: Vec<Row> = state
        .carousel
        .window()
        .iter()
        .map(|entry| {
            let style = if entry.user_has_liked {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default()
            };
            Row::new(vec![
                entry.movie.title.clone(),
                format_rating(entry.average_rating),
                entry.likes_count.to_string(),
                String::from(if entry.user_has_liked { "\u{2665}" } else { "" }),
                entry
                    .movie
                    .release_date
                    .clone()
                    .unwrap_or_else(|| String::from("-")),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(2),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Movies ")
                .border_style(pane_border(state, ActivePane::Movies)),
        )
        .row_highlight_style(highlight_style());

    frame.render_stateful_widget(table, area, &mut state.movie_table_state);
}

/// Draws the review list of the selected movie, with a sentinel row while
/// more reviews are hidden.
fn draw_posts(frame: &mut Frame, area: Rect, state: &mut BrowseState) {
    let title = state.current_movie().map_or_else(
        || String::from(" Reviews "),
        |entry| format!(" Reviews: {} ", entry.movie.title),
    );

    let header = Row::new(vec!["Stars", "Nick", "Date", "Review"])
        .style(header_style())
        .bottom_margin(1);

    let mut rows: Vec<Row> = state
        .visible_posts()
        .iter()
        .map(|post| {
            let style = if post.is_owned_by(state.viewer) {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Row::new(vec![
                render_stars(post.rating_star),
                post.member_nick.clone(),
                post.reg_date.clone(),
                String::from(post.preview()),
            ])
            .style(style)
        })
        .collect();

    if state.has_more_posts() {
        rows.push(
            Row::new(vec![
                String::from("\u{2026}"),
                format!(
                    "{}/{} shown",
                    state.visible_posts().len(),
                    state.total_posts()
                ),
            ])
            .style(Style::default().fg(Color::DarkGray)),
        );
    }

    let widths = [
        Constraint::Length(7),
        Constraint::Length(16),
        Constraint::Length(12),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(pane_border(state, ActivePane::Posts)),
        )
        .row_highlight_style(highlight_style());

    frame.render_stateful_widget(table, area, &mut state.post_table_state);
}

/// Draws the footer with key hints or the last status message.
fn draw_footer(frame: &mut Frame, area: Rect, state: &BrowseState) {
    let line = state.status.as_deref().map_or_else(
        || match state.active_pane {
            ActivePane::Movies => Line::from(vec![Span::raw(
                "\u{2190}\u{2192}: page  \u{2191}\u{2193}/j/k: move  space: like  Tab: reviews  q: quit",
            )]),
            ActivePane::Posts => Line::from(vec![Span::raw(
                "\u{2191}\u{2193}/j/k: move  d: delete mine  Tab: movies  q: quit",
            )]),
        },
        |message| Line::from(Span::styled(message, Style::default().fg(Color::Yellow))),
    );

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
