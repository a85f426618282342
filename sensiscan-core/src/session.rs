// sensiscan-core/src/session.rs
//! The single database session shared by every component of a run.
//!
//! A fleet is laid out as `<fleet_root>/<database>/<schema>.<ext>`. The session
//! opens the catalog schema of the home database as its main connection and
//! attaches other schema files read-only, on demand. Each attachment is keyed by
//! its `(database, schema)` pair and gets a fresh alias `s<n>` from a counter,
//! so distinct pairs never share an alias. Attachments are recycled
//! least-recently-used first so the engine's attach limit is never exceeded.
//!
//! The connection is released when the session is dropped, whichever way the
//! run ends.
//!
//! License: MIT OR APACHE 2.0

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rusqlite::Connection;

use crate::config::ScanConfig;
use crate::descriptor::ConnectionDescriptor;
use crate::errors::ScanError;
use crate::validators::{ensure_safe_identifier, quote_identifier};

#[derive(Debug)]
pub struct SqliteSession {
    conn: Connection,
    descriptor: ConnectionDescriptor,
    fleet_root: PathBuf,
    schema_extensions: Vec<String>,
    max_attached: usize,
    attached: RefCell<VecDeque<Attachment>>,
    next_alias: Cell<u64>,
}

#[derive(Debug)]
struct Attachment {
    database: String,
    schema: String,
    alias: String,
}

impl SqliteSession {
    /// Opens the home database's catalog schema. Any failure here is fatal to a run.
    pub fn open(descriptor: &ConnectionDescriptor, config: &ScanConfig) -> Result<Self, ScanError> {
        ensure_safe_identifier(&descriptor.database)?;
        ensure_safe_identifier(&config.catalog.schema)?;

        let home_dir = config.fleet_root.join(&descriptor.database);
        if !home_dir.is_dir() {
            return Err(ScanError::DatabaseNotFound(
                descriptor.database.clone(),
                config.fleet_root.display().to_string(),
            ));
        }

        let catalog_path = find_schema_file(&home_dir, &config.catalog.schema, &config.schema_extensions)
            .unwrap_or_else(|| {
                let ext = config.schema_extensions.first().map(String::as_str).unwrap_or("sqlite");
                home_dir.join(format!("{}.{}", config.catalog.schema, ext))
            });

        let conn = Connection::open(&catalog_path)?;
        info!(
            "Successfully connected to server: {}, database: {} ({}), trusted_connection={}",
            descriptor.server,
            descriptor.database,
            catalog_path.display(),
            descriptor.trusted_connection
        );

        Ok(Self {
            conn,
            descriptor: descriptor.clone(),
            fleet_root: config.fleet_root.clone(),
            schema_extensions: config.schema_extensions.clone(),
            max_attached: config.max_attached.max(2),
            attached: RefCell::new(VecDeque::new()),
            next_alias: Cell::new(0),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn database_dir(&self, database: &str) -> PathBuf {
        self.fleet_root.join(database)
    }

    pub fn schema_extensions(&self) -> &[String] {
        &self.schema_extensions
    }

    /// The file backing `database.schema`, if one exists.
    pub fn schema_file(&self, database: &str, schema: &str) -> Option<PathBuf> {
        find_schema_file(&self.database_dir(database), schema, &self.schema_extensions)
    }

    /// `(database, schema)` pairs currently attached, least recently used first.
    pub fn attached_schemas(&self) -> Vec<(String, String)> {
        self.attached
            .borrow()
            .iter()
            .map(|a| (a.database.clone(), a.schema.clone()))
            .collect()
    }

    /// Ensures `database.schema` is attached and returns its alias.
    pub fn attach(&self, database: &str, schema: &str) -> Result<String, ScanError> {
        ensure_safe_identifier(database)?;
        ensure_safe_identifier(schema)?;
        let mut attached = self.attached.borrow_mut();

        if let Some(pos) = attached.iter().position(|a| a.database == database && a.schema == schema) {
            if let Some(existing) = attached.remove(pos) {
                let alias = existing.alias.clone();
                attached.push_back(existing);
                return Ok(alias);
            }
        }

        let path = self
            .schema_file(database, schema)
            .ok_or_else(|| ScanError::SchemaNotFound(database.to_string(), schema.to_string()))?;

        while attached.len() >= self.max_attached {
            let Some(oldest) = attached.pop_front() else { break };
            debug!("Detaching {}.{} ({})", oldest.database, oldest.schema, oldest.alias);
            self.conn.execute_batch(&format!("DETACH DATABASE {}", quote_identifier(&oldest.alias)?))?;
        }

        let n = self.next_alias.get();
        self.next_alias.set(n + 1);
        let alias = format!("s{}", n);

        self.conn.execute(
            &format!("ATTACH DATABASE ?1 AS {}", quote_identifier(&alias)?),
            [read_only_uri(&path)],
        )?;
        debug!("Attached {} as {}", path.display(), alias);
        attached.push_back(Attachment {
            database: database.to_string(),
            schema: schema.to_string(),
            alias: alias.clone(),
        });
        Ok(alias)
    }
}

impl Drop for SqliteSession {
    fn drop(&mut self) {
        for attachment in self.attached.get_mut().drain(..) {
            if let Ok(quoted) = quote_identifier(&attachment.alias) {
                if let Err(e) = self.conn.execute_batch(&format!("DETACH DATABASE {}", quoted)) {
                    warn!("Failed to detach {}.{}: {}", attachment.database, attachment.schema, e);
                }
            }
        }
        info!("Database connection to {} closed", self.descriptor.database);
    }
}

fn find_schema_file(dir: &Path, schema: &str, extensions: &[String]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("{}.{}", schema, ext)))
        .find(|p| p.is_file())
}

/// SQLite URI that opens `path` read-only. Requires URI filenames, which
/// `Connection::open` enables.
fn read_only_uri(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '?' => escaped.push_str("%3f"),
            '#' => escaped.push_str("%23"),
            _ => escaped.push(c),
        }
    }
    format!("file:{}?mode=ro", escaped)
}
