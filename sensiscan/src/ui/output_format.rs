//! Small helpers for status lines written to stderr.

use anyhow::Result;
use is_terminal::IsTerminal;
use std::io::{self, Write};

use crate::ui::theme::{paint, ThemeEntry, ThemeMap};

fn print_message<W: Write>(
    writer: &mut W,
    prefix: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    enable_colors: bool,
) -> Result<()> {
    writeln!(writer, "{}", paint(&format!("{}{}", prefix, msg), entry, theme, enable_colors))?;
    Ok(())
}

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, enable_colors: bool) -> Result<()> {
    print_message(writer, "", msg, ThemeEntry::Info, theme, enable_colors)
}

pub fn print_success_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, enable_colors: bool) -> Result<()> {
    print_message(writer, "", msg, ThemeEntry::Success, theme, enable_colors)
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, enable_colors: bool) -> Result<()> {
    print_message(writer, "Warning: ", msg, ThemeEntry::Warn, theme, enable_colors)
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, enable_colors: bool) -> Result<()> {
    print_message(writer, "Error: ", msg, ThemeEntry::Error, theme, enable_colors)
}

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let colors = io::stderr().is_terminal();
    let _ = print_info_message(&mut io::stderr(), msg.as_ref(), theme, colors);
}

/// Helper for printing success messages to stderr.
pub fn success_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let colors = io::stderr().is_terminal();
    let _ = print_success_message(&mut io::stderr(), msg.as_ref(), theme, colors);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let colors = io::stderr().is_terminal();
    let _ = print_warn_message(&mut io::stderr(), msg.as_ref(), theme, colors);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let colors = io::stderr().is_terminal();
    let _ = print_error_message(&mut io::stderr(), msg.as_ref(), theme, colors);
}
