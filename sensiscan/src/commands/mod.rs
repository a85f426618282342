//! Implementations of the CLI subcommands.

pub mod check_config;
pub mod ledger;
pub mod references;
pub mod scan;

use anyhow::{Context, Result};
use log::debug;

use sensiscan_core::ScanConfig;

use crate::cli::ConfigArgs;

/// Loads the configuration named by `args` (or the first candidate, or the
/// embedded defaults) and applies the command-line overrides. Not validated.
pub fn load_config(args: &ConfigArgs) -> Result<ScanConfig> {
    let config = ScanConfig::load(args.config.as_deref()).context("Failed to load scan configuration")?;
    let config = config.with_overrides(args.fleet_root.clone(), args.threshold, args.cap);
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}
