// sensiscan-core/src/model.rs
//! Core data structures shared by every component: reference fields,
//! discovered candidates, ledger keys and entries, and match results.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A known sensitive field from the reference catalog.
///
/// Identity is `(database, table, field)`; `server` and `status` are carried
/// along for the ledger and for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveFieldReference {
    pub server: String,
    pub database: String,
    pub table: String,
    pub field: String,
    pub data_type: String,
    pub status: Option<String>,
}

impl SensitiveFieldReference {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}", self.database, self.table, self.field)
    }
}

/// A column discovered in the fleet, eligible for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateField {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub data_type: String,
}

impl CandidateField {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}.{}", self.database, self.schema, self.table, self.column)
    }
}

/// The unique key of a ledger row: a candidate unit plus the reference it was
/// evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub ref_server: String,
    pub ref_database: String,
    pub ref_table: String,
    pub ref_field: String,
}

impl PairKey {
    pub fn new(candidate: &CandidateField, reference: &SensitiveFieldReference) -> Self {
        Self {
            database: candidate.database.clone(),
            schema: candidate.schema.clone(),
            table: candidate.table.clone(),
            column: candidate.column.clone(),
            ref_server: reference.server.clone(),
            ref_database: reference.database.clone(),
            ref_table: reference.table.clone(),
            ref_field: reference.field.clone(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{} vs {}.{}.{}",
            self.database, self.schema, self.table, self.column, self.ref_database, self.ref_table, self.ref_field
        )
    }
}

/// Outcome recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LedgerStatus {
    Processed,
    Sensitive,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Processed => "Processed",
            LedgerStatus::Sensitive => "Sensitive",
        }
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("processed") {
            Ok(LedgerStatus::Processed)
        } else if s.eq_ignore_ascii_case("sensitive") {
            Ok(LedgerStatus::Sensitive)
        } else {
            Err(format!("unknown ledger status '{}'", s))
        }
    }
}

/// One row of the processed-pair ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: PairKey,
    pub status: LedgerStatus,
    pub data_type: Option<String>,
    pub run_id: Option<String>,
    pub processed_at: String,
}

/// Result of one comparison. Consumed immediately, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub candidate: &'a CandidateField,
    pub reference: &'a SensitiveFieldReference,
    pub overlap_count: u64,
}
