//! The `references` command: lists the catalog's known sensitive fields.

use anyhow::Result;
use std::io;

use sensiscan_core::{CatalogStore, SqliteCatalog, SqliteSession};

use crate::cli::CatalogCommand;
use crate::commands::load_config;
use crate::ui::summary::print_references;

pub fn run_references_command(cmd: &CatalogCommand) -> Result<()> {
    let descriptor = cmd.connection.descriptor()?;
    let config = load_config(&cmd.config)?;

    let session = SqliteSession::open(&descriptor, &config)?;
    let catalog = SqliteCatalog::new(&session, &config.catalog, "")?;
    let references = catalog.try_load_references()?;

    print_references(&references, &mut io::stdout().lock())
}
