// sensiscan-core/tests/catalog_store_tests.rs
mod common;

use common::Fleet;
use sensiscan_core::{
    CandidateField, CatalogStore, CatalogTypeResolver, ComparableTypes, LedgerStatus, LedgerTracker, PairKey,
    ProgressTracker, SensitiveFieldReference, SqliteCatalog, SqliteSession, TypeResolver,
};
use test_log::test;

fn key(column: &str) -> PairKey {
    let candidate = CandidateField {
        database: "Sales".into(),
        schema: "dbo".into(),
        table: "Customers".into(),
        column: column.into(),
        data_type: "varchar(11)".into(),
    };
    let reference = SensitiveFieldReference {
        server: "dwdb".into(),
        database: "HR".into(),
        table: "Employees".into(),
        field: "SSN".into(),
        data_type: "varchar".into(),
        status: None,
    };
    PairKey::new(&candidate, &reference)
}

#[test]
fn ledger_is_created_once_and_never_replaced() {
    let fleet = Fleet::new();
    let config = fleet.config(&["Sales"]);
    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "run-a").unwrap();

    assert!(catalog.ensure_ledger().unwrap());
    catalog.record_processed(&key("Name"), "nvarchar(100)").unwrap();
    assert!(!catalog.ensure_ledger().unwrap());
    assert_eq!(catalog.ledger_entries().len(), 1);
}

#[test]
fn marks_are_idempotent_and_first_write_wins() {
    let fleet = Fleet::new();
    let config = fleet.config(&["Sales"]);
    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "run-a").unwrap();
    catalog.ensure_ledger().unwrap();
    let tracker = LedgerTracker::new(&catalog);

    let k = key("TaxID");
    assert!(!tracker.has(&k));
    tracker.mark_sensitive(&k, "varchar(11)").unwrap();
    tracker.mark_sensitive(&k, "varchar(11)").unwrap();
    tracker.mark_processed(&k, "varchar(11)").unwrap();
    assert!(tracker.has(&k));

    let entries = catalog.ledger_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, k);
    assert_eq!(entries[0].status, LedgerStatus::Sensitive);
    assert_eq!(entries[0].data_type.as_deref(), Some("varchar(11)"));
    assert_eq!(entries[0].run_id.as_deref(), Some("run-a"));
}

#[test]
fn writes_without_a_ledger_fail_and_reads_degrade() {
    let fleet = Fleet::new();
    let config = fleet.config(&["Sales"]);
    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "run-a").unwrap();

    assert!(!catalog.is_processed(&key("TaxID")));
    assert!(catalog.record_processed(&key("TaxID"), "varchar").is_err());
    assert!(catalog.try_ledger_entries().is_err());
    assert!(catalog.ledger_entries().is_empty());
}

#[test]
fn references_are_sanitized_and_incomplete_rows_skipped() {
    let fleet = Fleet::new();
    fleet.add_reference("HR", "Employees", "SSN\u{0}", "varchar");
    fleet.add_reference("HR", "Employees", "", "varchar");
    fleet
        .catalog()
        .execute_batch("INSERT INTO ref_cde_data_sensitive VALUES ('dwdb', 'HR', 'Employees', 'Email', NULL, NULL);")
        .unwrap();
    let config = fleet.config(&["Sales"]);
    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "run-a").unwrap();

    let references = catalog.load_references();
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].field, "SSN");
    assert_eq!(references[0].status.as_deref(), Some("active"));
}

#[test]
fn missing_reference_table_degrades_or_propagates() {
    let fleet = Fleet::new();
    fleet.catalog().execute_batch("DROP TABLE ref_cde_data_sensitive;").unwrap();
    let config = fleet.config(&["Sales"]);
    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "run-a").unwrap();

    assert!(catalog.load_references().is_empty());
    assert!(catalog.try_load_references().is_err());
}

#[test]
fn resolver_prefers_configured_types() {
    let fleet = Fleet::new();
    fleet.add_comparable("VARCHAR", "varchar");
    fleet.add_comparable("varchar", "Text");
    let config = fleet.config(&["Sales"]);
    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "run-a").unwrap();
    let resolver = CatalogTypeResolver::new(&catalog);

    let types = resolver.comparable_types("varchar");
    assert!(types.is_configured());
    assert!(types.admits("TEXT"));
    assert!(types.admits("varchar(50)"));
    assert!(!types.admits("nchar(10)"));

    assert_eq!(
        resolver.comparable_types("date"),
        ComparableTypes::Configured(Default::default())
    );
}

#[test]
fn resolver_falls_back_to_builtin_buckets() {
    let fleet = Fleet::new();
    fleet.catalog().execute_batch("DROP TABLE datatype_compare;").unwrap();
    let config = fleet.config(&["Sales"]);
    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "run-a").unwrap();
    let resolver = CatalogTypeResolver::new(&catalog);

    let types = resolver.comparable_types("int");
    assert!(!types.is_configured());
    assert!(types.admits("BIGINT"));
    assert!(!types.admits("varchar(10)"));
}
