// sensiscan/src/main.rs
//! Sensiscan entry point.
//!
//! Loads `.env`, initializes logging and dispatches to the selected command.
//! A failed discovery run exits with code 1.

use std::process::ExitCode;

use clap::Parser;
use log::debug;

use sensiscan::cli::{Cli, Commands};
use sensiscan::commands::{check_config, ledger, references, scan};
use sensiscan::logger;
use sensiscan::ui::output_format::error_msg;
use sensiscan::ui::theme::default_theme_map;

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let args = Cli::parse();
    logger::init_logger(logger::level_from_flags(args.quiet, args.debug));
    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    let theme = default_theme_map();
    let outcome = match &args.command {
        Commands::Scan(cmd) => scan::run_scan_command(cmd, &theme, args.quiet),
        Commands::References(cmd) => references::run_references_command(cmd).map(|()| true),
        Commands::Ledger(cmd) => ledger::run_ledger_command(cmd).map(|()| true),
        Commands::CheckConfig(cfg) => check_config::run_check_config_command(cfg, &theme).map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error_msg(format!("{:#}", e), &theme);
            ExitCode::FAILURE
        }
    }
}
