// sensiscan-core/src/headless.rs
//! Convenience wrappers for running a whole discovery in one call (non-UI).
//!
//! `run_scan` wires the SQLite-backed components together around one session
//! and returns the run summary. `scan_for_sensitive_data` reduces that to the
//! boolean outcome callers of a batch job care about.

use log::{error, info};
use uuid::Uuid;

use crate::catalog::SqliteCatalog;
use crate::config::ScanConfig;
use crate::descriptor::ConnectionDescriptor;
use crate::discovery::SqliteDiscovery;
use crate::engines::sql_engine::SqlMatchingEngine;
use crate::errors::ScanError;
use crate::orchestrator::{ClassificationPolicy, DiscoveryOrchestrator, RunSummary};
use crate::resolver::CatalogTypeResolver;
use crate::session::SqliteSession;
use crate::tracker::LedgerTracker;

/// Opens a session for `descriptor`, runs discovery and closes the session.
///
/// # Errors
///
/// Fails when the session cannot be established (including ledger bootstrap)
/// or when the reference fields cannot be read.
pub fn run_scan(descriptor: &ConnectionDescriptor, config: &ScanConfig) -> Result<RunSummary, ScanError> {
    if descriptor.trusted_connection {
        info!("Connecting to {} with a trusted connection", descriptor);
    } else {
        info!("Connecting to {}", descriptor);
    }
    let session = SqliteSession::open(descriptor, config)?;
    info!("Database connection established");

    let catalog = SqliteCatalog::new(&session, &config.catalog, Uuid::new_v4().to_string())?;
    catalog.ensure_ledger()?;

    let discovery = SqliteDiscovery::new(&session, config);
    let resolver = CatalogTypeResolver::new(&catalog);
    let engine = SqlMatchingEngine::new(&session, &config.matching);
    let tracker = LedgerTracker::new(&catalog);

    DiscoveryOrchestrator::new(
        &catalog,
        &discovery,
        &resolver,
        &engine,
        &tracker,
        ClassificationPolicy::from_config(&config.matching),
    )
    .with_run_id(catalog.run_id())
    .run()
}

/// Runs discovery and reports whether it completed. Failures are logged.
pub fn scan_for_sensitive_data(descriptor: &ConnectionDescriptor, config: &ScanConfig) -> bool {
    match run_scan(descriptor, config) {
        Ok(summary) => summary.succeeded(),
        Err(e) => {
            error!("Sensitive data discovery failed: {}", e);
            false
        }
    }
}
