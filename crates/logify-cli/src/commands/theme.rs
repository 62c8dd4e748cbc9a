//! Theme command.

use crate::output::{self, row, OutputFormat};
use anyhow::Result;
use logify_session::{Palette, Theme, ThemeStore};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
struct ThemeView {
    theme: Theme,
    palette: &'static Palette,
}

impl fmt::Display for ThemeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.palette;
        writeln!(f, "{}", row("Theme", &self.theme.to_string()))?;
        writeln!(f, "{}", row("Background", p.background))?;
        writeln!(f, "{}", row("Surface", p.surface))?;
        writeln!(f, "{}", row("Primary", p.primary))?;
        writeln!(f, "{}", row("Text", p.text_primary))?;
        writeln!(f, "{}", row("Text (muted)", p.text_secondary))?;
        writeln!(f, "{}", row("Status bar", p.status_bar))?;
        writeln!(f, "{}", row("Safe area", p.safe_area))?;
        write!(f, "{}", row("Header", p.header))
    }
}

/// Show the theme palette, optionally toggled from the default.
pub fn theme(toggle: bool, format: OutputFormat) -> Result<()> {
    let mut store = ThemeStore::new();
    if toggle {
        store.toggle();
    }

    let view = ThemeView {
        theme: store.theme(),
        palette: store.palette(),
    };
    output::print(&view, format);
    Ok(())
}
