// sensiscan-core/src/lib.rs
//! # Sensiscan Core Library
//!
//! `sensiscan-core` discovers and classifies sensitive data across a fleet of
//! databases. It starts from a catalog of known sensitive fields, walks every
//! candidate column it is allowed to see, and flags a column as sensitive when
//! enough of the known sensitive values also occur in it. Every evaluated pair
//! is recorded in a durable ledger, so an interrupted run simply resumes.
//!
//! ## Modules
//!
//! * `config`: `ScanConfig` and friends, loaded from YAML with embedded defaults.
//! * `descriptor`: parsing of the connection descriptor.
//! * `session`: the SQLite session over the fleet, with bounded schema attachments.
//! * `catalog`: the `CatalogStore` trait: reference fields, type equivalences, the ledger.
//! * `discovery`: the `MetadataDiscovery` trait and the lazy `CandidateUnits` walk.
//! * `resolver`: type compatibility between reference and candidate fields.
//! * `engine`: the `MatchingEngine` trait.
//! * `engines`: concrete `MatchingEngine` implementations.
//! * `tracker`: the `ProgressTracker` trait over the ledger.
//! * `orchestrator`: the discovery run and its classification policy.
//! * `headless`: one-call entry points for batch use.
//! * `sanitizers`: the text sanitation applied to everything read from a database.
//! * `validators`: identifier allow-listing for dynamic SQL.
//!
//! ## Usage Example
//!
//! ```no_run
//! use sensiscan_core::{ConnectionDescriptor, ScanConfig, run_scan};
//!
//! fn main() -> anyhow::Result<()> {
//!     let descriptor: ConnectionDescriptor = "dwdb/DQ_DEV?trusted_connection=true".parse()?;
//!     let config = ScanConfig::load(None)?;
//!     let summary = run_scan(&descriptor, &config)?;
//!     println!("{} sensitive fields found", summary.sensitive);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Component seams return [`ScanError`]. Configuration loading uses
//! `anyhow::Result` with context. Only establishing the session and reading the
//! reference fields can fail a run; everything else is logged and isolated to
//! the unit it happened in.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod sanitizers;
pub mod session;
pub mod tracker;
pub mod validators;

/// Re-exports the configuration types.
pub use config::{CatalogConfig, MatchingConfig, ScanConfig, DEFAULT_OVERLAP_CAP, DEFAULT_SENSITIVE_THRESHOLD};

/// Re-exports the custom error type for clear error reporting.
pub use errors::ScanError;

pub use descriptor::ConnectionDescriptor;
pub use session::SqliteSession;

/// Re-exports the component traits and their SQLite implementations.
pub use catalog::{CatalogStore, SqliteCatalog};
pub use discovery::{CandidateUnits, ColumnInfo, MetadataDiscovery, SqliteDiscovery};
pub use engine::MatchingEngine;
pub use engines::sql_engine::SqlMatchingEngine;
pub use resolver::{CatalogTypeResolver, ComparableTypes, TypeResolver};
pub use tracker::{LedgerTracker, ProgressTracker};

pub use model::{CandidateField, LedgerEntry, LedgerStatus, MatchResult, PairKey, SensitiveFieldReference};
pub use orchestrator::{ClassificationPolicy, DiscoveryOrchestrator, RunSummary, SensitiveFinding, UnitOutcome};

/// Re-exports the one-shot entry points.
pub use headless::{run_scan, scan_for_sensitive_data};
