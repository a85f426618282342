//! The `ledger` command: prints what previous runs recorded.

use anyhow::{Context, Result};
use std::io;

use sensiscan_core::{LedgerStatus, SqliteCatalog, SqliteSession};

use crate::cli::LedgerCommand;
use crate::commands::load_config;
use crate::ui::summary::print_ledger;

pub fn run_ledger_command(cmd: &LedgerCommand) -> Result<()> {
    let descriptor = cmd.connection.descriptor()?;
    let config = load_config(&cmd.config)?;

    let session = SqliteSession::open(&descriptor, &config)?;
    let catalog = SqliteCatalog::new(&session, &config.catalog, "")?;
    let mut entries = catalog
        .try_ledger_entries()
        .with_context(|| format!("Failed to read ledger {}", config.catalog.ledger_table))?;
    if cmd.sensitive_only {
        entries.retain(|e| e.status == LedgerStatus::Sensitive);
    }

    print_ledger(&entries, &mut io::stdout().lock())
}
