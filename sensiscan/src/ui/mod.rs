//! Terminal output: colors, status lines and tables.

pub mod output_format;
pub mod summary;
pub mod theme;
