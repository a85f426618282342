//! The `check-config` command: validates and prints the effective configuration.

use anyhow::Result;
use std::io::{self, Write};

use crate::cli::ConfigArgs;
use crate::commands::load_config;
use crate::ui::output_format::success_msg;
use crate::ui::theme::ThemeMap;

pub fn run_check_config_command(args: &ConfigArgs, theme: &ThemeMap) -> Result<()> {
    let config = load_config(args)?;
    config.validate()?;

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", config.to_yaml()?)?;
    success_msg("Configuration is valid.", theme);
    Ok(())
}
