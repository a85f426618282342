//! errors.rs - Custom error types for the sensiscan-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Component seams return `Result<_, ScanError>`; the orchestrator decides
//! which of them are fatal and which are local to a single unit.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `sensiscan-core` library.
///
/// New variants may be added as more engines are supported, hence `#[non_exhaustive]`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScanError {
    #[error("Invalid connection descriptor '{0}': {1}")]
    InvalidDescriptor(String, String),

    #[error("Identifier '{0}' is not allowed in dynamic SQL (only [A-Za-z0-9_] up to {1} characters)")]
    UnsafeIdentifier(String, usize),

    #[error("Database '{0}' was not found under the fleet root {1}")]
    DatabaseNotFound(String, String),

    #[error("Schema '{0}.{1}' has no database file")]
    SchemaNotFound(String, String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),
}
