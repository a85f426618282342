// sensiscan-core/tests/common/mod.rs
//! Builds throwaway SQLite fleets for the integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use sensiscan_core::{ConnectionDescriptor, ScanConfig};
use tempfile::TempDir;

pub const HOME_DB: &str = "DQ_DEV";

pub struct Fleet {
    pub dir: TempDir,
}

impl Fleet {
    /// A fleet whose home database holds an empty reference table and an
    /// empty type-equivalence table.
    pub fn new() -> Self {
        let fleet = Self {
            dir: TempDir::new().expect("tempdir"),
        };
        fleet
            .schema(HOME_DB, "dbo")
            .execute_batch(
                "CREATE TABLE ref_cde_data_sensitive (
                    server_name TEXT, database_name TEXT, table_name TEXT,
                    field_name TEXT, type_data TEXT, status TEXT
                 );
                 CREATE TABLE datatype_compare (datatype_ref TEXT, datatypecompare TEXT);",
            )
            .expect("catalog tables");
        fleet
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Opens (creating if needed) `<root>/<database>/<schema>.sqlite`.
    pub fn schema(&self, database: &str, schema: &str) -> Connection {
        let dir = self.root().join(database);
        std::fs::create_dir_all(&dir).expect("database dir");
        Connection::open(dir.join(format!("{}.sqlite", schema))).expect("schema file")
    }

    pub fn catalog(&self) -> Connection {
        self.schema(HOME_DB, "dbo")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root().join(HOME_DB).join("dbo.sqlite")
    }

    pub fn add_reference(&self, database: &str, table: &str, field: &str, data_type: &str) {
        self.catalog()
            .execute(
                "INSERT INTO ref_cde_data_sensitive VALUES ('dwdb', ?1, ?2, ?3, ?4, 'active')",
                params![database, table, field, data_type],
            )
            .expect("reference row");
    }

    pub fn add_comparable(&self, reference_type: &str, comparable: &str) {
        self.catalog()
            .execute(
                "INSERT INTO datatype_compare VALUES (?1, ?2)",
                params![reference_type, comparable],
            )
            .expect("datatype_compare row");
    }

    /// `<database>/dbo.sqlite` gets table `table` with a single column filled
    /// with `values`.
    pub fn table_with_values(&self, database: &str, table: &str, column: &str, declared: &str, values: &[String]) {
        let mut conn = self.schema(database, "dbo");
        conn.execute_batch(&format!("CREATE TABLE \"{}\" (\"{}\" {});", table, column, declared))
            .expect("create table");
        let tx = conn.transaction().expect("tx");
        {
            let mut stmt = tx
                .prepare(&format!("INSERT INTO \"{}\" VALUES (?1)", table))
                .expect("insert stmt");
            for v in values {
                stmt.execute([v]).expect("insert");
            }
        }
        tx.commit().expect("commit");
    }

    pub fn descriptor(&self) -> ConnectionDescriptor {
        ConnectionDescriptor::new("dwdb", HOME_DB, true)
    }

    pub fn config(&self, databases: &[&str]) -> ScanConfig {
        ScanConfig {
            fleet_root: self.root().to_path_buf(),
            databases: databases.iter().map(|d| d.to_string()).collect(),
            ..ScanConfig::default()
        }
    }

    pub fn ledger_rows(&self) -> Vec<(String, String, String)> {
        let conn = self.catalog();
        let mut stmt = conn
            .prepare("SELECT table_name, column_name, status FROM processed_fields ORDER BY id")
            .expect("ledger query");
        stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .expect("ledger rows")
            .collect::<Result<Vec<_>, _>>()
            .expect("ledger decode")
    }
}

/// `count` distinct SSN-shaped strings.
pub fn ssns(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{:03}-{:02}-{:04}", i / 1_000_000 % 1000, i / 10_000 % 100, i % 10_000))
        .collect()
}
