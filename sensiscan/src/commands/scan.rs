//! The `scan` command: one discovery run over the fleet.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;
use std::fs;
use std::io::{self, Write};

use sensiscan_core::{run_scan, RunSummary};

use crate::cli::ScanCommand;
use crate::commands::load_config;
use crate::ui::output_format::{error_msg, info_msg, success_msg, warn_msg};
use crate::ui::summary::print_run_summary;
use crate::ui::theme::ThemeMap;

/// Runs discovery. `Ok(false)` means the run itself failed (connection or
/// reference acquisition); `Err` means it never started.
pub fn run_scan_command(cmd: &ScanCommand, theme: &ThemeMap, quiet: bool) -> Result<bool> {
    let descriptor = cmd.connection.descriptor()?;
    let config = load_config(&cmd.config)?;
    config.validate()?;
    if config.cap_below_threshold() {
        warn_msg(
            format!(
                "Overlap cap {} is below the sensitive threshold {}; no field can be classified as sensitive.",
                config.matching.overlap_cap, config.matching.sensitive_threshold
            ),
            theme,
        );
    }

    let summary = match run_scan(&descriptor, &config) {
        Ok(summary) => summary,
        Err(e) => {
            error_msg(format!("Discovery failed: {}", e), theme);
            return Ok(false);
        }
    };

    write_json_outputs(cmd, &summary, theme)?;

    if !quiet && !cmd.json_stdout {
        let stderr_supports_color = io::stderr().is_terminal();
        print_run_summary(&summary, &mut io::stderr(), theme, stderr_supports_color)?;
    }
    if summary.ledger_failures > 0 {
        info_msg(
            format!(
                "{} pairs could not be recorded and will be evaluated again on the next run.",
                summary.ledger_failures
            ),
            theme,
        );
    }

    info!("Scan command completed.");
    Ok(summary.succeeded())
}

fn write_json_outputs(cmd: &ScanCommand, summary: &RunSummary, theme: &ThemeMap) -> Result<()> {
    if let Some(path) = &cmd.json_file {
        let json = serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
        fs::write(path, json).with_context(|| format!("Failed to write JSON summary to {}", path.display()))?;
        success_msg(format!("Run summary written to {}", path.display()), theme);
    }
    if cmd.json_stdout {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        serde_json::to_writer_pretty(&mut writer, summary).context("Failed to serialize run summary")?;
        writeln!(writer)?;
    }
    Ok(())
}
