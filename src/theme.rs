//! Light/dark theme preference
//!
//! The chosen theme is persisted under the global `theme` key so it survives
//! restarts. The toggle label always offers the *other* theme.

use ratatui::style::Color;
use tracing::warn;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the theme name
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colours used when drawing the UI in a given theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub muted: Color,
    pub link: Color,
    pub error: Color,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parses a stored theme name
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Text of the toggle control while this theme is active
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "☀️ Light Mode",
            Theme::Light => "🌙 Dark Mode",
        }
    }

    /// Loads the persisted theme, defaulting to light
    ///
    /// A missing, unknown or unreadable value falls back to [`Theme::Light`].
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match store.get(THEME_KEY) {
            Ok(Some(value)) => Self::from_str(&value).unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                Theme::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(self, store: &S) -> Result<(), StorageError> {
        store.set(THEME_KEY, self.as_str())
    }

    /// Switches to the other theme and persists it
    ///
    /// The new theme takes effect even if persisting it fails.
    pub fn toggle<S: KeyValueStore + ?Sized>(&mut self, store: &S) {
        *self = self.toggled();
        if let Err(e) = self.save(store) {
            warn!(error = %e, theme = self.as_str(), "Failed to persist theme preference");
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Color::White,
                foreground: Color::Black,
                accent: Color::Blue,
                muted: Color::DarkGray,
                link: Color::Blue,
                error: Color::Red,
            },
            Theme::Dark => Palette {
                background: Color::Black,
                foreground: Color::White,
                accent: Color::Cyan,
                muted: Color::Gray,
                link: Color::LightCyan,
                error: Color::LightRed,
            },
        }
    }
}
