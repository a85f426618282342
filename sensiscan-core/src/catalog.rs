// sensiscan-core/src/catalog.rs
//! The catalog store: reference fields, operator type equivalences and the
//! processed-pair ledger, all in the home database's catalog schema.
//!
//! Reads that fail are logged and degrade to an empty answer; writes that fail
//! are logged and reported back to the caller as an error value. Every string
//! read from the store goes through the sanitation contract.
//!
//! License: MIT OR APACHE 2.0

use chrono::Utc;
use log::{debug, error, info, warn};
use rusqlite::{params, OptionalExtension};

use crate::config::CatalogConfig;
use crate::errors::ScanError;
use crate::model::{LedgerEntry, LedgerStatus, PairKey, SensitiveFieldReference};
use crate::sanitizers::text::sanitized_column;
use crate::session::SqliteSession;
use crate::validators::quote_identifier;

/// Durable reference data and the processed-pair ledger.
pub trait CatalogStore {
    /// Loads every usable reference field, propagating read failures.
    fn try_load_references(&self) -> Result<Vec<SensitiveFieldReference>, ScanError>;

    /// Loads every usable reference field. A failed read yields an empty list.
    fn load_references(&self) -> Vec<SensitiveFieldReference> {
        match self.try_load_references() {
            Ok(references) => references,
            Err(e) => {
                error!("Error retrieving sensitive data references: {}", e);
                Vec::new()
            }
        }
    }

    /// Operator-configured comparable types for `reference_type`. An error
    /// means the equivalence table itself is unavailable.
    fn comparable_types(&self, reference_type: &str) -> Result<Vec<String>, ScanError>;

    /// Whether `key` is already in the ledger. A failed read answers `false`
    /// so the pair is evaluated again rather than silently skipped.
    fn is_processed(&self, key: &PairKey) -> bool;

    fn record_processed(&self, key: &PairKey, data_type: &str) -> Result<(), ScanError>;

    fn record_sensitive(&self, key: &PairKey, data_type: &str) -> Result<(), ScanError>;
}

/// `CatalogStore` backed by the session's main (catalog) connection.
pub struct SqliteCatalog<'s> {
    session: &'s SqliteSession,
    reference_table: String,
    comparable_types_table: String,
    ledger_table: String,
    ledger_name: String,
    run_id: String,
}

impl<'s> SqliteCatalog<'s> {
    pub fn new(session: &'s SqliteSession, config: &CatalogConfig, run_id: impl Into<String>) -> Result<Self, ScanError> {
        Ok(Self {
            session,
            reference_table: quote_identifier(&config.reference_table)?,
            comparable_types_table: quote_identifier(&config.comparable_types_table)?,
            ledger_table: quote_identifier(&config.ledger_table)?,
            ledger_name: config.ledger_table.clone(),
            run_id: run_id.into(),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Creates the ledger table if it does not exist yet. Never replaces an
    /// existing one. Returns `true` when the table was created.
    pub fn ensure_ledger(&self) -> Result<bool, ScanError> {
        let conn = self.session.connection();
        let exists = conn
            .query_row(
                "SELECT 1 FROM main.sqlite_master WHERE type = 'table' AND name = ?1",
                [&self.ledger_name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            debug!("Ledger table {} already exists", self.ledger_name);
            return Ok(false);
        }

        conn.execute_batch(&format!(
            "CREATE TABLE main.{t} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                database_name TEXT NOT NULL,
                schema_name TEXT NOT NULL,
                table_name TEXT NOT NULL,
                column_name TEXT NOT NULL,
                ref_server TEXT NOT NULL,
                ref_db TEXT NOT NULL,
                ref_table TEXT NOT NULL,
                ref_field TEXT NOT NULL,
                data_type TEXT,
                status TEXT NOT NULL DEFAULT 'Processed',
                run_id TEXT,
                process_date TEXT NOT NULL,
                UNIQUE (database_name, schema_name, table_name, column_name,
                        ref_server, ref_db, ref_table, ref_field)
            );",
            t = self.ledger_table
        ))?;
        info!("Created ledger table {}", self.ledger_name);
        Ok(true)
    }

    /// Every ledger row, oldest first, propagating read failures.
    pub fn try_ledger_entries(&self) -> Result<Vec<LedgerEntry>, ScanError> {
        let mut stmt = self.session.connection().prepare(&format!(
            "SELECT database_name, schema_name, table_name, column_name,
                    ref_server, ref_db, ref_table, ref_field,
                    status, data_type, run_id, process_date
             FROM main.{} ORDER BY id",
            self.ledger_table
        ))?;
        let rows = stmt.query_map([], |row| {
            let text = |idx: usize| -> rusqlite::Result<String> { Ok(sanitized_column(row, idx)?.unwrap_or_default()) };
            let key = PairKey {
                database: text(0)?,
                schema: text(1)?,
                table: text(2)?,
                column: text(3)?,
                ref_server: text(4)?,
                ref_database: text(5)?,
                ref_table: text(6)?,
                ref_field: text(7)?,
            };
            let status = text(8)?.parse::<LedgerStatus>().unwrap_or(LedgerStatus::Processed);
            Ok(LedgerEntry {
                key,
                status,
                data_type: sanitized_column(row, 9)?,
                run_id: sanitized_column(row, 10)?,
                processed_at: text(11)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every ledger row. A failed read yields an empty list.
    pub fn ledger_entries(&self) -> Vec<LedgerEntry> {
        self.try_ledger_entries().unwrap_or_else(|e| {
            error!("Error reading ledger {}: {}", self.ledger_name, e);
            Vec::new()
        })
    }

    fn insert(&self, key: &PairKey, data_type: &str, status: LedgerStatus) -> Result<(), ScanError> {
        self.session.connection().execute(
            &format!(
                "INSERT INTO main.{} (
                    database_name, schema_name, table_name, column_name,
                    ref_server, ref_db, ref_table, ref_field,
                    data_type, status, run_id, process_date
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT DO NOTHING",
                self.ledger_table
            ),
            params![
                key.database,
                key.schema,
                key.table,
                key.column,
                key.ref_server,
                key.ref_database,
                key.ref_table,
                key.ref_field,
                data_type,
                status.as_str(),
                self.run_id,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl CatalogStore for SqliteCatalog<'_> {
    fn try_load_references(&self) -> Result<Vec<SensitiveFieldReference>, ScanError> {
        let mut stmt = self.session.connection().prepare(&format!(
            "SELECT server_name, database_name, table_name, field_name, type_data, status FROM main.{}",
            self.reference_table
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                sanitized_column(row, 0)?,
                sanitized_column(row, 1)?,
                sanitized_column(row, 2)?,
                sanitized_column(row, 3)?,
                sanitized_column(row, 4)?,
                sanitized_column(row, 5)?,
            ))
        })?;

        let mut references = Vec::new();
        for row in rows {
            let (server, database, table, field, data_type, status) = row?;
            match (database, table, field, data_type) {
                (Some(database), Some(table), Some(field), Some(data_type))
                    if !database.is_empty() && !table.is_empty() && !field.is_empty() && !data_type.trim().is_empty() =>
                {
                    references.push(SensitiveFieldReference {
                        server: server.unwrap_or_default(),
                        database,
                        table,
                        field,
                        data_type,
                        status,
                    });
                }
                (database, table, field, _) => warn!(
                    "Skipping incomplete reference row: database={:?}, table={:?}, field={:?}",
                    database, table, field
                ),
            }
        }
        Ok(references)
    }

    fn comparable_types(&self, reference_type: &str) -> Result<Vec<String>, ScanError> {
        let mut stmt = self.session.connection().prepare(&format!(
            "SELECT datatypecompare FROM main.{} WHERE datatype_ref = ?1 COLLATE NOCASE",
            self.comparable_types_table
        ))?;
        let rows = stmt.query_map([reference_type], |row| sanitized_column(row, 0))?;
        let mut types = Vec::new();
        for row in rows {
            if let Some(t) = row? {
                types.push(t);
            }
        }
        Ok(types)
    }

    fn is_processed(&self, key: &PairKey) -> bool {
        let found = self
            .session
            .connection()
            .query_row(
                &format!(
                    "SELECT 1 FROM main.{} WHERE database_name = ?1 AND schema_name = ?2
                       AND table_name = ?3 AND column_name = ?4 AND ref_server = ?5
                       AND ref_db = ?6 AND ref_table = ?7 AND ref_field = ?8 LIMIT 1",
                    self.ledger_table
                ),
                params![
                    key.database,
                    key.schema,
                    key.table,
                    key.column,
                    key.ref_server,
                    key.ref_database,
                    key.ref_table,
                    key.ref_field,
                ],
                |_| Ok(()),
            )
            .optional();
        match found {
            Ok(hit) => hit.is_some(),
            Err(e) => {
                error!("Error checking ledger for {}: {}", key, e);
                false
            }
        }
    }

    fn record_processed(&self, key: &PairKey, data_type: &str) -> Result<(), ScanError> {
        self.insert(key, data_type, LedgerStatus::Processed).map_err(|e| {
            error!("Error marking field as processed ({}): {}", key, e);
            e
        })
    }

    fn record_sensitive(&self, key: &PairKey, data_type: &str) -> Result<(), ScanError> {
        self.insert(key, data_type, LedgerStatus::Sensitive).map_err(|e| {
            error!("Error marking field as sensitive ({}): {}", key, e);
            e
        })
    }
}
