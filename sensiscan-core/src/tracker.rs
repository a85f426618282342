// sensiscan-core/src/tracker.rs
//! Progress tracking over the ledger.
//!
//! Both marks are durable when they return `Ok`: each is a single autocommit
//! insert. An existing row is never changed, so re-marking a pair is a no-op.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};

use crate::catalog::CatalogStore;
use crate::errors::ScanError;
use crate::model::PairKey;

/// Records which (candidate, reference) pairs are done.
pub trait ProgressTracker {
    fn has(&self, key: &PairKey) -> bool;

    fn mark_processed(&self, key: &PairKey, data_type: &str) -> Result<(), ScanError>;

    /// Records the pair as processed and classified sensitive in one row.
    fn mark_sensitive(&self, key: &PairKey, data_type: &str) -> Result<(), ScanError>;
}

/// `ProgressTracker` persisting through a `CatalogStore` ledger.
pub struct LedgerTracker<'a> {
    catalog: &'a dyn CatalogStore,
}

impl<'a> LedgerTracker<'a> {
    pub fn new(catalog: &'a dyn CatalogStore) -> Self {
        Self { catalog }
    }
}

impl ProgressTracker for LedgerTracker<'_> {
    fn has(&self, key: &PairKey) -> bool {
        self.catalog.is_processed(key)
    }

    fn mark_processed(&self, key: &PairKey, data_type: &str) -> Result<(), ScanError> {
        self.catalog.record_processed(key, data_type)?;
        debug!(
            "Marked field as processed: {}.{}.{}.{}",
            key.database, key.schema, key.table, key.column
        );
        Ok(())
    }

    fn mark_sensitive(&self, key: &PairKey, data_type: &str) -> Result<(), ScanError> {
        self.catalog.record_sensitive(key, data_type)?;
        info!(
            "Marked field as sensitive: {}.{}.{}.{} (matches {}.{}.{})",
            key.database, key.schema, key.table, key.column, key.ref_database, key.ref_table, key.ref_field
        );
        Ok(())
    }
}
