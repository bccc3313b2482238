//! Story pane rendering
//!
//! Draws whatever the feed controller says the pane holds: a loading notice,
//! the error message, an empty-section notice, or one card per story.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{StoryProvider, StorySummary};
use crate::feed::FeedState;
use crate::storage::KeyValueStore;
use crate::theme::Palette;

/// Shown while a fetch is in flight
pub const LOADING_TEXT: &str = "Loading...";

/// Shown when a section has no stories
pub const EMPTY_TEXT: &str = "No stories available for this category.";

/// Renders the story pane into `area`
pub fn render<S, P>(frame: &mut Frame, app: &App<S, P>, area: Rect)
where
    S: KeyValueStore + Clone,
    P: StoryProvider + 'static,
{
    let palette = app.theme.palette();
    let title = match app.current_category() {
        Some(category) => format!(" {} ", category),
        None => " Stories ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let paragraph = match app.feed_state() {
        FeedState::Idle => Paragraph::new(""),
        FeedState::Loading => Paragraph::new(LOADING_TEXT)
            .style(Style::default().fg(palette.accent))
            .alignment(Alignment::Center),
        FeedState::Error(message) => Paragraph::new(message.as_str())
            .style(Style::default().fg(palette.error))
            .alignment(Alignment::Center),
        FeedState::Rendered(stories) if stories.is_empty() => Paragraph::new(EMPTY_TEXT)
            .style(Style::default().fg(palette.muted))
            .alignment(Alignment::Center),
        FeedState::Rendered(stories) => {
            let cards: Vec<Vec<Line>> = stories
                .iter()
                .enumerate()
                .map(|(i, story)| story_card(story, i == app.selected_story, &palette))
                .collect();
            let inner = block.inner(area);
            let offset = scroll_offset(&cards, app.selected_story, inner.width, inner.height);
            Paragraph::new(cards.concat())
                .wrap(Wrap { trim: false })
                .scroll((offset, 0))
        }
    };

    frame.render_widget(paragraph.block(block), area);
}

/// Rows `line` occupies once wrapped to `width` columns
fn wrapped_rows(line: &Line, width: u16) -> usize {
    let width = usize::from(width.max(1));
    line.width().div_ceil(width).max(1)
}

/// First visible row of the story pane so the selected card is on screen
///
/// Scrolls only as far as needed to show the end of the selected card, and
/// never past its title.
fn scroll_offset(cards: &[Vec<Line>], selected: usize, width: u16, height: u16) -> u16 {
    let rows: Vec<usize> = cards
        .iter()
        .map(|card| card.iter().map(|line| wrapped_rows(line, width)).sum())
        .collect();
    let Some(selected_rows) = rows.get(selected) else {
        return 0;
    };
    let start: usize = rows[..selected].iter().sum();
    let end = start + selected_rows;
    let offset = end.saturating_sub(usize::from(height)).min(start);
    u16::try_from(offset).unwrap_or(u16::MAX)
}

/// Lines making up one story card, followed by a blank separator
fn story_card(story: &StorySummary, selected: bool, palette: &Palette) -> Vec<Line<'static>> {
    let marker = if selected { "▶ " } else { "  " };
    let title_style = if selected {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default()
            .fg(palette.foreground)
            .add_modifier(Modifier::BOLD)
    };

    vec![
        Line::from(vec![
            Span::raw(marker),
            Span::styled(story.title.clone(), title_style),
        ]),
        Line::from(Span::styled(
            format!("  [img] {}", story.image_url),
            Style::default().fg(palette.muted),
        )),
        Line::from(Span::styled(
            format!("  {}", story.summary),
            Style::default().fg(palette.foreground),
        )),
        Line::from(vec![
            Span::styled("  Read more: ", Style::default().fg(palette.muted)),
            Span::styled(
                story.url.clone(),
                Style::default()
                    .fg(palette.link)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        Line::from(""),
    ]
}
