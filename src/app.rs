//! Application state management for the top stories reader
//!
//! This module contains the main application state: the category tabs, the
//! story selection, the theme, keyboard handling, and the glue between the
//! feed controller and background fetches.

use crossterm::event::{KeyCode, KeyEvent};

use crate::data::{default_categories, Category, StoryProvider, StorySummary};
use crate::feed::{Completion, FeedState, Selection, StoryFeedController};
use crate::fetch::FetchHandle;
use crate::storage::KeyValueStore;
use crate::theme::Theme;

/// Main application struct managing state and data
pub struct App<S, P> {
    /// Categories shown as tabs, in order
    pub categories: Vec<Category>,
    /// Index of the active tab
    pub selected_tab: usize,
    /// Index of the highlighted story in the rendered list
    pub selected_story: usize,
    /// Active colour theme
    pub theme: Theme,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Cache-or-fetch orchestration for the story pane
    controller: StoryFeedController<S, P>,
    /// Store holding the theme preference
    store: S,
    /// In-flight fetches
    fetches: FetchHandle,
}

impl<S, P> App<S, P>
where
    S: KeyValueStore + Clone,
    P: StoryProvider + 'static,
{
    /// Creates an App with the default tab list and the persisted theme
    ///
    /// `initial` becomes the active tab; it is appended to the tabs if it is
    /// not one of the defaults. No selection is made until [`App::start`].
    pub fn new(controller: StoryFeedController<S, P>, store: S, initial: Category) -> Self {
        let mut categories = default_categories();
        let selected_tab = match categories.iter().position(|c| *c == initial) {
            Some(index) => index,
            None => {
                categories.push(initial);
                categories.len() - 1
            }
        };

        Self {
            categories,
            selected_tab,
            selected_story: 0,
            theme: Theme::load(&store),
            show_help: false,
            should_quit: false,
            controller,
            store,
            fetches: FetchHandle::new(),
        }
    }

    /// Selects the initial tab
    pub fn start(&mut self) {
        self.select_tab(self.selected_tab);
    }

    pub fn feed_state(&self) -> &FeedState {
        self.controller.state()
    }

    /// Category of the active tab
    pub fn current_category(&self) -> Option<&Category> {
        self.categories.get(self.selected_tab)
    }

    /// Stories currently on screen, if any
    pub fn stories(&self) -> &[StorySummary] {
        match self.controller.state() {
            FeedState::Rendered(stories) => stories.as_slice(),
            _ => &[],
        }
    }

    /// Activates tab `index` and selects its category
    ///
    /// Fresh cached stories appear immediately; otherwise a background fetch is
    /// started and the pane shows the loading state until it completes.
    pub fn select_tab(&mut self, index: usize) {
        let Some(category) = self.categories.get(index).cloned() else {
            return;
        };
        self.selected_tab = index;
        self.selected_story = 0;

        if let Selection::Fetch(ticket) = self.controller.begin_selection(category) {
            self.fetches.spawn(self.controller.provider(), ticket);
        }
    }

    /// Applies any finished fetches to the story pane
    ///
    /// # Returns
    /// `true` if a result changed what is displayed
    pub fn poll_fetches(&mut self) -> bool {
        let mut changed = false;
        while let Some(message) = self.fetches.try_recv() {
            if self.controller.complete_fetch(message.ticket, message.result) == Completion::Applied {
                self.selected_story = 0;
                changed = true;
            }
        }
        changed
    }

    pub fn next_tab(&mut self) {
        if self.categories.is_empty() {
            return;
        }
        self.select_tab((self.selected_tab + 1) % self.categories.len());
    }

    pub fn previous_tab(&mut self) {
        if self.categories.is_empty() {
            return;
        }
        let len = self.categories.len();
        self.select_tab((self.selected_tab + len - 1) % len);
    }

    /// Moves story selection up
    pub fn move_selection_up(&mut self) {
        self.selected_story = self.selected_story.saturating_sub(1);
    }

    /// Moves story selection down
    pub fn move_selection_down(&mut self) {
        let count = self.stories().len();
        if self.selected_story + 1 < count {
            self.selected_story += 1;
        }
    }

    /// Switches between light and dark and persists the choice
    pub fn toggle_theme(&mut self) {
        self.theme.toggle(&self.store);
    }

    /// Handles keyboard input
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                self.next_tab();
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                self.previous_tab();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                if index < self.categories.len() {
                    self.select_tab(index);
                }
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
