//! Theme preference.
//!
//! Dark by default; held in memory only.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Dark => &DARK_PALETTE,
            Self::Light => &LIGHT_PALETTE,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dark => "dark",
            Self::Light => "light",
        })
    }
}

/// Named colors for one theme, as `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub primary: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub status_bar: &'static str,
    pub safe_area: &'static str,
    pub header: &'static str,
}

pub const PRIMARY: &str = "#007AFF";
pub const SECONDARY: &str = "#34C759";
pub const WARNING: &str = "#FF9500";
pub const DANGER: &str = "#FF3B30";

pub const DARK_PALETTE: Palette = Palette {
    background: "#121212",
    surface: "#1E1E1E",
    primary: PRIMARY,
    text_primary: "#FFFFFF",
    text_secondary: "#B0B0B0",
    status_bar: "#1E1E1E",
    safe_area: "#1E1E1E",
    header: "#1E1E1E",
};

pub const LIGHT_PALETTE: Palette = Palette {
    background: "#F5F5F5",
    surface: "#FFFFFF",
    primary: PRIMARY,
    text_primary: "#000000",
    text_secondary: "#888888",
    status_bar: "#F5F5F5",
    safe_area: "#F5F5F5",
    header: "#F5F5F5",
};

/// Current theme selection.
#[derive(Debug, Clone, Default)]
pub struct ThemeStore {
    theme: Theme,
}

impl ThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    pub fn palette(&self) -> &'static Palette {
        self.theme.palette()
    }

    /// Flip between dark and light; returns the new theme.
    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }
}
