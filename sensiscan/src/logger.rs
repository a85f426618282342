// sensiscan/src/logger.rs
//! Logger initialization for the `sensiscan` binary.
//!
//! `RUST_LOG` is honored unless an explicit level is passed in, in which case
//! the explicit level applies to every module.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Default filter when neither `RUST_LOG` nor a flag is given.
pub const DEFAULT_FILTER: &str = "info";

/// Initializes `env_logger`. Safe to call more than once; later calls are ignored.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized; keeping the existing one.");
    }
}

/// Maps the `--quiet` / `--debug` flags to an explicit level, if any.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    match (quiet, debug) {
        (true, _) => Some(LevelFilter::Error),
        (false, true) => Some(LevelFilter::Debug),
        (false, false) => None,
    }
}
