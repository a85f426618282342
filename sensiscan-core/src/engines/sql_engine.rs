// sensiscan-core/src/engines/sql_engine.rs
//! A `MatchingEngine` implementation that runs one bounded join between the
//! candidate table and the reference table on the shared session.
//!
//! The count is a sufficiency signal, not a cardinality: at most `overlap_cap`
//! distinct reference values are counted. NULL, blank and sentinel values on
//! the reference side never count. Identifiers are allow-listed and quoted;
//! the cap and the sentinels are bound parameters.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::config::MatchingConfig;
use crate::engine::MatchingEngine;
use crate::errors::ScanError;
use crate::model::{CandidateField, SensitiveFieldReference};
use crate::session::SqliteSession;
use crate::validators::quote_identifier;

#[derive(Debug)]
pub struct SqlMatchingEngine<'s> {
    session: &'s SqliteSession,
    overlap_cap: u64,
    sentinel_values: Vec<String>,
    reference_schema: String,
}

impl<'s> SqlMatchingEngine<'s> {
    pub fn new(session: &'s SqliteSession, config: &MatchingConfig) -> Self {
        Self {
            session,
            overlap_cap: config.overlap_cap,
            sentinel_values: config.sentinel_values.clone(),
            reference_schema: config.reference_schema.clone(),
        }
    }

    pub fn overlap_cap(&self) -> u64 {
        self.overlap_cap
    }

    /// The overlap query, without its parameters. Parameter `?1` is the cap,
    /// `?2..` are the sentinel values.
    fn overlap_sql(
        &self,
        reference: &SensitiveFieldReference,
        candidate: &CandidateField,
        reference_alias: &str,
        candidate_alias: &str,
    ) -> Result<String, ScanError> {
        let ref_field = quote_identifier(&reference.field)?;
        let sentinel_clause = if self.sentinel_values.is_empty() {
            String::new()
        } else {
            let placeholders: Vec<String> = (0..self.sentinel_values.len()).map(|i| format!("?{}", i + 2)).collect();
            format!("AND b.{} NOT IN ({})", ref_field, placeholders.join(", "))
        };

        Ok(format!(
            "SELECT COUNT(*) FROM (
                SELECT DISTINCT b.{rf}
                FROM {ca}.{ct} AS a
                INNER JOIN {ra}.{rt} AS b ON a.{cc} = b.{rf}
                WHERE b.{rf} IS NOT NULL
                  AND TRIM(CAST(b.{rf} AS TEXT)) <> ''
                  {sentinels}
                LIMIT ?1
            )",
            rf = ref_field,
            ca = quote_identifier(candidate_alias)?,
            ct = quote_identifier(&candidate.table)?,
            cc = quote_identifier(&candidate.column)?,
            ra = quote_identifier(reference_alias)?,
            rt = quote_identifier(&reference.table)?,
            sentinels = sentinel_clause,
        ))
    }

    /// Runs the overlap query, propagating every failure.
    pub fn try_count_overlap(
        &self,
        reference: &SensitiveFieldReference,
        candidate: &CandidateField,
    ) -> Result<u64, ScanError> {
        let candidate_alias = self.session.attach(&candidate.database, &candidate.schema)?;
        let reference_alias = self.session.attach(&reference.database, &self.reference_schema)?;
        let sql = self.overlap_sql(reference, candidate, &reference_alias, &candidate_alias)?;

        let mut values = Vec::with_capacity(self.sentinel_values.len() + 1);
        values.push(Value::Integer(i64::try_from(self.overlap_cap).unwrap_or(i64::MAX)));
        values.extend(self.sentinel_values.iter().cloned().map(Value::Text));

        let count: i64 = self
            .session
            .connection()
            .query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl MatchingEngine for SqlMatchingEngine<'_> {
    fn count_overlap(&self, reference: &SensitiveFieldReference, candidate: &CandidateField) -> u64 {
        match self.try_count_overlap(reference, candidate) {
            Ok(count) => {
                debug!(
                    "Overlap between {} and {}: {}",
                    reference.qualified_name(),
                    candidate.qualified_name(),
                    count
                );
                count
            }
            Err(e) => {
                warn!(
                    "Error checking matching records between {} and {}: {}",
                    reference.qualified_name(),
                    candidate.qualified_name(),
                    e
                );
                0
            }
        }
    }
}
