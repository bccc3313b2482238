//! UI rendering module for the top stories reader
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod story_list;

pub use help_overlay::render as render_help_overlay;
pub use story_list::render as render_story_list;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::data::StoryProvider;
use crate::storage::KeyValueStore;

/// Renders the whole screen: header, category tabs, stories and key hints
pub fn render<S, P>(frame: &mut Frame, app: &App<S, P>)
where
    S: KeyValueStore + Clone,
    P: StoryProvider + 'static,
{
    let palette = app.theme.palette();
    let base = Style::default().fg(palette.foreground).bg(palette.background);
    frame.render_widget(Block::default().style(base), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Line::from(vec![
        Span::styled(
            " Top Stories ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[t] {}", app.theme.toggle_label()),
            Style::default().fg(palette.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(header).style(base), chunks[0]);

    let titles: Vec<Line> = app
        .categories
        .iter()
        .map(|c| Line::from(c.as_str().to_string()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.selected_tab)
        .style(base)
        .highlight_style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, chunks[1]);

    story_list::render(frame, app, chunks[2]);

    let footer = Paragraph::new(Line::from(Span::styled(
        " ←/→ section  ↑/↓ story  t theme  ? help  q quit",
        Style::default().fg(palette.muted),
    )))
    .style(base);
    frame.render_widget(footer, chunks[3]);

    if app.show_help {
        help_overlay::render(frame, app.theme);
    }
}
