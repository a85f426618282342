// sensiscan-core/src/orchestrator.rs
//! The discovery run: for every reference field, walk the fleet's candidate
//! units, skip what the ledger already holds, gate on type compatibility,
//! count the overlap, classify and persist.
//!
//! Only reference acquisition is fatal here. Everything below it is isolated
//! per unit: a failed comparison counts as no evidence, a failed ledger write
//! leaves the pair unprocessed for the next run.
//!
//! License: MIT OR APACHE 2.0

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::config::{MatchingConfig, DEFAULT_SENSITIVE_THRESHOLD};
use crate::discovery::{CandidateUnits, MetadataDiscovery};
use crate::engine::MatchingEngine;
use crate::errors::ScanError;
use crate::model::{CandidateField, PairKey, SensitiveFieldReference};
use crate::resolver::{ComparableTypes, TypeResolver};
use crate::tracker::ProgressTracker;

/// Decides when an overlap is strong enough to call a field sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationPolicy {
    pub sensitive_threshold: u64,
}

impl ClassificationPolicy {
    pub fn new(sensitive_threshold: u64) -> Self {
        Self { sensitive_threshold }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.sensitive_threshold)
    }

    pub fn is_sensitive(&self, overlap: u64) -> bool {
        overlap >= self.sensitive_threshold
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_THRESHOLD)
    }
}

/// What happened to one (candidate, reference) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    AlreadyProcessed,
    TypeIncompatible,
    Cleared { overlap: u64 },
    Sensitive { overlap: u64 },
    LedgerWriteFailed,
}

/// A field newly classified sensitive during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensitiveFinding {
    pub candidate: CandidateField,
    pub reference: String,
    pub overlap: u64,
}

/// Counters and findings of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub references: usize,
    pub candidates_seen: u64,
    pub already_processed: u64,
    pub type_incompatible: u64,
    pub cleared: u64,
    pub sensitive: u64,
    pub ledger_failures: u64,
    pub sensitive_fields: Vec<SensitiveFinding>,
}

impl RunSummary {
    fn start(run_id: &str, references: usize) -> Self {
        Self {
            run_id: run_id.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            references,
            candidates_seen: 0,
            already_processed: 0,
            type_incompatible: 0,
            cleared: 0,
            sensitive: 0,
            ledger_failures: 0,
            sensitive_fields: Vec::new(),
        }
    }

    fn record(&mut self, candidate: &CandidateField, reference: &SensitiveFieldReference, outcome: UnitOutcome) {
        self.candidates_seen += 1;
        match outcome {
            UnitOutcome::AlreadyProcessed => self.already_processed += 1,
            UnitOutcome::TypeIncompatible => self.type_incompatible += 1,
            UnitOutcome::Cleared { .. } => self.cleared += 1,
            UnitOutcome::Sensitive { overlap } => {
                self.sensitive += 1;
                self.sensitive_fields.push(SensitiveFinding {
                    candidate: candidate.clone(),
                    reference: reference.qualified_name(),
                    overlap,
                });
            }
            UnitOutcome::LedgerWriteFailed => self.ledger_failures += 1,
        }
    }

    /// A run succeeds once it gets past reference acquisition. Per-unit
    /// failures do not fail the run.
    pub fn succeeded(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// Drives one discovery run over injected components.
pub struct DiscoveryOrchestrator<'a> {
    catalog: &'a dyn CatalogStore,
    discovery: &'a dyn MetadataDiscovery,
    resolver: &'a dyn TypeResolver,
    engine: &'a dyn MatchingEngine,
    tracker: &'a dyn ProgressTracker,
    policy: ClassificationPolicy,
    run_id: String,
}

impl<'a> DiscoveryOrchestrator<'a> {
    pub fn new(
        catalog: &'a dyn CatalogStore,
        discovery: &'a dyn MetadataDiscovery,
        resolver: &'a dyn TypeResolver,
        engine: &'a dyn MatchingEngine,
        tracker: &'a dyn ProgressTracker,
        policy: ClassificationPolicy,
    ) -> Self {
        Self {
            catalog,
            discovery,
            resolver,
            engine,
            tracker,
            policy,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Runs discovery to completion.
    ///
    /// # Errors
    ///
    /// Returns an error only when the reference fields cannot be acquired.
    pub fn run(&self) -> Result<RunSummary, ScanError> {
        info!("Starting sensitive data discovery run {}", self.run_id);
        let references = self.catalog.try_load_references().map_err(|e| {
            error!("Error retrieving sensitive data references: {}", e);
            e
        })?;
        info!("Found {} sensitive field references", references.len());

        let mut summary = RunSummary::start(&self.run_id, references.len());
        for reference in &references {
            info!(
                "Processing sensitive field {} ({})",
                reference.qualified_name(),
                reference.data_type
            );
            let comparable = self.resolver.comparable_types(&reference.data_type);
            if !comparable.is_configured() {
                debug!(
                    "Using built-in comparable types for {}: {:?}",
                    reference.data_type,
                    comparable.types()
                );
            }

            for candidate in CandidateUnits::new(self.discovery) {
                let outcome = self.process_unit(reference, &comparable, &candidate);
                summary.record(&candidate, reference, outcome);
            }
        }

        summary.finished_at = Some(Utc::now());
        info!(
            "Discovery run {} complete: {} sensitive, {} cleared, {} incompatible, {} skipped, {} ledger failures",
            self.run_id,
            summary.sensitive,
            summary.cleared,
            summary.type_incompatible,
            summary.already_processed,
            summary.ledger_failures
        );
        Ok(summary)
    }

    /// Handles one (candidate, reference) pair end to end.
    pub fn process_unit(
        &self,
        reference: &SensitiveFieldReference,
        comparable: &ComparableTypes,
        candidate: &CandidateField,
    ) -> UnitOutcome {
        let key = PairKey::new(candidate, reference);
        if self.tracker.has(&key) {
            debug!("Skipping already processed pair {}", key);
            return UnitOutcome::AlreadyProcessed;
        }

        if !comparable.admits(&candidate.data_type) {
            debug!(
                "Skipping {} ({}): not comparable to {}",
                candidate.qualified_name(),
                candidate.data_type,
                reference.data_type
            );
            return match self.tracker.mark_processed(&key, &candidate.data_type) {
                Ok(()) => UnitOutcome::TypeIncompatible,
                Err(_) => UnitOutcome::LedgerWriteFailed,
            };
        }

        debug!("Checking field: {} ({})", candidate.qualified_name(), candidate.data_type);
        let result = self.engine.evaluate(reference, candidate);
        let overlap = result.overlap_count;

        if self.policy.is_sensitive(overlap) {
            info!(
                "Sensitive data found in {} ({} matching values with {})",
                candidate.qualified_name(),
                overlap,
                reference.qualified_name()
            );
            match self.tracker.mark_sensitive(&key, &candidate.data_type) {
                Ok(()) => UnitOutcome::Sensitive { overlap },
                Err(_) => {
                    warn!("Sensitive classification of {} was not persisted", key);
                    UnitOutcome::LedgerWriteFailed
                }
            }
        } else {
            match self.tracker.mark_processed(&key, &candidate.data_type) {
                Ok(()) => UnitOutcome::Cleared { overlap },
                Err(_) => UnitOutcome::LedgerWriteFailed,
            }
        }
    }
}
