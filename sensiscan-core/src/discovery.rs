// sensiscan-core/src/discovery.rs
//! Metadata discovery over the fleet, and the lazy walk that turns the
//! database → schema → table → column hierarchy into a flat sequence of
//! candidate units.
//!
//! Discovery is read-only. A unit that cannot be listed yields an empty list
//! and a log line; the walk carries on with its siblings. Names that are not
//! safe identifiers are skipped with a warning at every level.
//!
//! License: MIT OR APACHE 2.0

use std::path::Path;
use std::vec;

use log::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::errors::ScanError;
use crate::model::CandidateField;
use crate::sanitizers::text::{sanitize_str, sanitized_column};
use crate::session::SqliteSession;
use crate::validators::{is_safe_identifier, quote_identifier};

/// A column and its declared type as the engine reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

/// Enumerates the fleet. Every call is unit-local: failures yield empty lists.
pub trait MetadataDiscovery {
    fn list_databases(&self) -> Vec<String>;
    fn list_schemas(&self, database: &str) -> Vec<String>;
    fn list_tables(&self, database: &str, schema: &str) -> Vec<String>;
    fn list_columns(&self, database: &str, schema: &str, table: &str) -> Vec<ColumnInfo>;
}

/// `MetadataDiscovery` over a directory fleet of SQLite files.
pub struct SqliteDiscovery<'s> {
    session: &'s SqliteSession,
    allow_list: Vec<String>,
    excluded_schemas: Vec<String>,
}

impl<'s> SqliteDiscovery<'s> {
    pub fn new(session: &'s SqliteSession, config: &ScanConfig) -> Self {
        Self {
            session,
            allow_list: config.databases.clone(),
            excluded_schemas: config.excluded_schemas.clone(),
        }
    }

    fn is_excluded(&self, schema: &str) -> bool {
        self.excluded_schemas.iter().any(|s| s.eq_ignore_ascii_case(schema))
    }

    fn try_list_schemas(&self, database: &str) -> Result<Vec<String>, ScanError> {
        let dir = self.session.database_dir(database);
        let mut schemas = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() || !self.has_schema_extension(&path) {
                continue;
            }
            let Some(stem) = path.file_stem() else { continue };
            let schema = sanitize_str(&stem.to_string_lossy());
            if self.is_excluded(&schema) {
                debug!("Skipping system schema {}.{}", database, schema);
                continue;
            }
            if !is_safe_identifier(&schema) {
                warn!("Skipping schema {}.{}: name is not a safe identifier", database, schema);
                continue;
            }
            if !schemas.contains(&schema) {
                schemas.push(schema);
            }
        }
        schemas.sort();
        Ok(schemas)
    }

    fn has_schema_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                self.session.schema_extensions().iter().any(|e| e.eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }

    fn try_list_tables(&self, database: &str, schema: &str) -> Result<Vec<String>, ScanError> {
        let alias = self.session.attach(database, schema)?;
        let mut stmt = self.session.connection().prepare(&format!(
            "SELECT name FROM {}.sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
             ORDER BY name",
            quote_identifier(&alias)?
        ))?;
        let rows = stmt.query_map([], |row| sanitized_column(row, 0))?;
        let mut tables = Vec::new();
        for row in rows {
            let Some(name) = row? else { continue };
            if !is_safe_identifier(&name) {
                warn!("Skipping table {}.{}.{}: name is not a safe identifier", database, schema, name);
                continue;
            }
            tables.push(name);
        }
        Ok(tables)
    }

    fn try_list_columns(&self, database: &str, schema: &str, table: &str) -> Result<Vec<ColumnInfo>, ScanError> {
        let alias = self.session.attach(database, schema)?;
        let mut stmt = self
            .session
            .connection()
            .prepare("SELECT name, type FROM pragma_table_info(?1, ?2) ORDER BY cid")?;
        let rows = stmt.query_map([table, alias.as_str()], |row| {
            Ok(ColumnInfo {
                name: sanitized_column(row, 0)?.unwrap_or_default(),
                declared_type: sanitized_column(row, 1)?.unwrap_or_default(),
            })
        })?;
        let mut columns = Vec::new();
        for row in rows {
            let column = row?;
            if !is_safe_identifier(&column.name) {
                warn!(
                    "Skipping column {}.{}.{}.{}: name is not a safe identifier",
                    database, schema, table, column.name
                );
                continue;
            }
            columns.push(column);
        }
        Ok(columns)
    }
}

impl MetadataDiscovery for SqliteDiscovery<'_> {
    fn list_databases(&self) -> Vec<String> {
        self.allow_list
            .iter()
            .filter(|db| {
                if !is_safe_identifier(db) {
                    warn!("Skipping database '{}': name is not a safe identifier", db);
                    return false;
                }
                let present = self.session.database_dir(db).is_dir();
                if !present {
                    warn!("Allow-listed database '{}' is not present in the fleet", db);
                }
                present
            })
            .cloned()
            .collect()
    }

    fn list_schemas(&self, database: &str) -> Vec<String> {
        self.try_list_schemas(database).unwrap_or_else(|e| {
            error!("Error retrieving schemas in database {}: {}", database, e);
            Vec::new()
        })
    }

    fn list_tables(&self, database: &str, schema: &str) -> Vec<String> {
        self.try_list_tables(database, schema).unwrap_or_else(|e| {
            error!("Error retrieving tables in {}.{}: {}", database, schema, e);
            Vec::new()
        })
    }

    fn list_columns(&self, database: &str, schema: &str, table: &str) -> Vec<ColumnInfo> {
        self.try_list_columns(database, schema, table).unwrap_or_else(|e| {
            error!("Error retrieving columns of {}.{}.{}: {}", database, schema, table, e);
            Vec::new()
        })
    }
}

/// Lazy, flat sequence of candidate units. Each level is listed only when the
/// walk reaches it, so a failure at one unit never affects its siblings.
pub struct CandidateUnits<'a> {
    discovery: &'a dyn MetadataDiscovery,
    databases: vec::IntoIter<String>,
    schemas: vec::IntoIter<String>,
    tables: vec::IntoIter<String>,
    pending: vec::IntoIter<CandidateField>,
    database: Option<String>,
    schema: Option<String>,
}

impl<'a> CandidateUnits<'a> {
    pub fn new(discovery: &'a dyn MetadataDiscovery) -> Self {
        let databases = discovery.list_databases();
        info!("Found {} databases to check", databases.len());
        Self {
            discovery,
            databases: databases.into_iter(),
            schemas: Vec::new().into_iter(),
            tables: Vec::new().into_iter(),
            pending: Vec::new().into_iter(),
            database: None,
            schema: None,
        }
    }
}

impl Iterator for CandidateUnits<'_> {
    type Item = CandidateField;

    fn next(&mut self) -> Option<CandidateField> {
        loop {
            if let Some(candidate) = self.pending.next() {
                return Some(candidate);
            }

            if let (Some(database), Some(schema)) = (&self.database, &self.schema) {
                if let Some(table) = self.tables.next() {
                    let columns = self.discovery.list_columns(database, schema, &table);
                    self.pending = columns
                        .into_iter()
                        .map(|c| CandidateField {
                            database: database.clone(),
                            schema: schema.clone(),
                            table: table.clone(),
                            column: c.name,
                            data_type: c.declared_type,
                        })
                        .collect::<Vec<_>>()
                        .into_iter();
                    continue;
                }
            }

            if let Some(database) = &self.database {
                if let Some(schema) = self.schemas.next() {
                    info!("Checking schema: {}.{}", database, schema);
                    let tables = self.discovery.list_tables(database, &schema);
                    debug!("Found {} tables in schema {}.{}", tables.len(), database, schema);
                    self.tables = tables.into_iter();
                    self.schema = Some(schema);
                    continue;
                }
            }

            let database = self.databases.next()?;
            info!("Checking database: {}", database);
            let schemas = self.discovery.list_schemas(&database);
            info!("Found {} schemas in database {}", schemas.len(), database);
            self.schemas = schemas.into_iter();
            self.tables = Vec::new().into_iter();
            self.schema = None;
            self.database = Some(database);
        }
    }
}
