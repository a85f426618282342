//! Module for managing the colors of the CLI's human-readable output.
//!
//! Each logical kind of output element maps to a foreground color. Colors are
//! only applied when the destination stream is a terminal.

use owo_colors::{AnsiColors, OwoColorize};
use std::collections::HashMap;

/// Type alias for the theme map, providing a consistent type definition.
pub type ThemeMap = HashMap<ThemeEntry, AnsiColors>;

/// The different logical parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeEntry {
    /// Prominent headers or section titles.
    Header,
    Success,
    Info,
    Warn,
    Error,
    /// A field classified as sensitive.
    Sensitive,
    /// Labels in a summary table.
    SummaryLabel,
    /// Counts in a summary table.
    SummaryCount,
}

/// Returns the default theme.
pub fn default_theme_map() -> ThemeMap {
    HashMap::from([
        (ThemeEntry::Header, AnsiColors::BrightCyan),
        (ThemeEntry::Success, AnsiColors::Green),
        (ThemeEntry::Info, AnsiColors::White),
        (ThemeEntry::Warn, AnsiColors::Yellow),
        (ThemeEntry::Error, AnsiColors::Red),
        (ThemeEntry::Sensitive, AnsiColors::BrightRed),
        (ThemeEntry::SummaryLabel, AnsiColors::Cyan),
        (ThemeEntry::SummaryCount, AnsiColors::BrightWhite),
    ])
}

/// Renders `text` in the color of `entry`, or unchanged when color is off.
pub fn paint(text: &str, entry: ThemeEntry, theme: &ThemeMap, enable_colors: bool) -> String {
    match theme.get(&entry) {
        Some(color) if enable_colors => text.color(*color).to_string(),
        _ => text.to_string(),
    }
}
