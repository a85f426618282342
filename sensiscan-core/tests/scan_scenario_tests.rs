// sensiscan-core/tests/scan_scenario_tests.rs
//! End-to-end runs over on-disk fleets.

mod common;

use std::cell::Cell;

use common::{ssns, Fleet};
use sensiscan_core::{
    run_scan, scan_for_sensitive_data, CandidateField, CatalogStore, CatalogTypeResolver, ClassificationPolicy,
    DiscoveryOrchestrator, LedgerStatus, LedgerTracker, MatchingEngine, PairKey, SensitiveFieldReference,
    SqlMatchingEngine, SqliteCatalog, SqliteDiscovery, SqliteSession,
};
use test_log::test;

/// HR.Employees.SSN is the reference; Sales.dbo.Customers holds 12,000 of its
/// values in TaxID, plus a textual and an integer column with none of them.
fn ssn_fleet() -> Fleet {
    let fleet = Fleet::new();
    fleet.add_reference("HR", "Employees", "SSN", "varchar");
    for t in ["varchar", "nvarchar", "char"] {
        fleet.add_comparable("varchar", t);
    }
    fleet.table_with_values("HR", "Employees", "SSN", "varchar(11)", &ssns(15_000));

    let mut sales = fleet.schema("Sales", "dbo");
    sales
        .execute_batch("CREATE TABLE Customers (TaxID varchar(11), Name nvarchar(100), Age INTEGER);")
        .unwrap();
    let tx = sales.transaction().unwrap();
    {
        let mut stmt = tx.prepare("INSERT INTO Customers VALUES (?1, ?2, ?3)").unwrap();
        for (i, ssn) in ssns(12_000).iter().enumerate() {
            stmt.execute(rusqlite::params![ssn, format!("Customer {}", i), (i % 90) as i64])
                .unwrap();
        }
    }
    tx.commit().unwrap();
    fleet
}

#[test]
fn scenario_classifies_tax_id_as_sensitive() {
    let fleet = ssn_fleet();
    let config = fleet.config(&["Sales"]).with_overrides(None, None, Some(50_000));

    let summary = run_scan(&fleet.descriptor(), &config).unwrap();
    assert!(summary.succeeded());
    assert_eq!(summary.references, 1);
    assert_eq!(summary.sensitive, 1);
    assert_eq!(summary.cleared, 1);
    assert_eq!(summary.type_incompatible, 1);
    assert_eq!(summary.sensitive_fields[0].overlap, 12_000);
    assert_eq!(summary.sensitive_fields[0].candidate.qualified_name(), "Sales.dbo.Customers.TaxID");

    let rows = fleet.ledger_rows();
    assert_eq!(
        rows,
        vec![
            ("Customers".to_string(), "TaxID".to_string(), "Sensitive".to_string()),
            ("Customers".to_string(), "Name".to_string(), "Processed".to_string()),
            ("Customers".to_string(), "Age".to_string(), "Processed".to_string()),
        ]
    );
}

#[test]
fn default_cap_keeps_overlap_below_threshold() {
    let fleet = ssn_fleet();
    let summary = run_scan(&fleet.descriptor(), &fleet.config(&["Sales"])).unwrap();
    assert_eq!(summary.sensitive, 0);
    assert_eq!(summary.cleared, 2);
}

struct CountingEngine<'s> {
    inner: SqlMatchingEngine<'s>,
    calls: Cell<usize>,
}

impl MatchingEngine for CountingEngine<'_> {
    fn count_overlap(&self, reference: &SensitiveFieldReference, candidate: &CandidateField) -> u64 {
        self.calls.set(self.calls.get() + 1);
        self.inner.count_overlap(reference, candidate)
    }
}

#[test]
fn rerun_makes_no_comparisons_and_changes_nothing() {
    let fleet = ssn_fleet();
    let config = fleet.config(&["Sales"]).with_overrides(None, None, Some(50_000));
    assert!(scan_for_sensitive_data(&fleet.descriptor(), &config));
    let before = fleet.ledger_rows();

    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "second-run").unwrap();
    assert!(!catalog.ensure_ledger().unwrap());
    let discovery = SqliteDiscovery::new(&session, &config);
    let resolver = CatalogTypeResolver::new(&catalog);
    let engine = CountingEngine {
        inner: SqlMatchingEngine::new(&session, &config.matching),
        calls: Cell::new(0),
    };
    let tracker = LedgerTracker::new(&catalog);

    let summary = DiscoveryOrchestrator::new(
        &catalog,
        &discovery,
        &resolver,
        &engine,
        &tracker,
        ClassificationPolicy::from_config(&config.matching),
    )
    .run()
    .unwrap();

    assert_eq!(engine.calls.get(), 0);
    assert_eq!(summary.already_processed, 3);
    assert_eq!(fleet.ledger_rows(), before);
}

#[test]
fn missing_reference_table_fails_the_run() {
    let fleet = Fleet::new();
    fleet.catalog().execute_batch("DROP TABLE ref_cde_data_sensitive;").unwrap();
    assert!(!scan_for_sensitive_data(&fleet.descriptor(), &fleet.config(&["Sales"])));
}

#[test]
fn missing_home_database_fails_the_run() {
    let fleet = Fleet::new();
    let descriptor = sensiscan_core::ConnectionDescriptor::new("dwdb", "Nowhere", false);
    assert!(run_scan(&descriptor, &fleet.config(&["Sales"])).is_err());
}

#[test]
fn unknown_databases_and_system_schemas_are_skipped() {
    let fleet = ssn_fleet();
    fleet
        .schema("Sales", "sys")
        .execute_batch("CREATE TABLE objects (TaxID varchar(11));")
        .unwrap();
    let config = fleet.config(&["Ghost", "Sales"]).with_overrides(None, None, Some(50_000));

    let summary = run_scan(&fleet.descriptor(), &config).unwrap();
    assert_eq!(summary.candidates_seen, 3);
    assert_eq!(summary.sensitive, 1);
}

#[test]
fn builtin_buckets_apply_without_equivalence_table() {
    let fleet = ssn_fleet();
    fleet.catalog().execute_batch("DROP TABLE datatype_compare;").unwrap();
    let config = fleet.config(&["Sales"]).with_overrides(None, None, Some(50_000));

    let summary = run_scan(&fleet.descriptor(), &config).unwrap();
    assert_eq!(summary.sensitive, 1);
    assert_eq!(summary.type_incompatible, 1);
}

#[test]
fn empty_equivalence_answer_admits_nothing() {
    let fleet = ssn_fleet();
    fleet.catalog().execute_batch("DELETE FROM datatype_compare;").unwrap();
    let config = fleet.config(&["Sales"]).with_overrides(None, None, Some(50_000));

    let summary = run_scan(&fleet.descriptor(), &config).unwrap();
    assert_eq!(summary.type_incompatible, 3);
    assert_eq!(summary.sensitive, 0);
}

fn pair(table: &str, column: &str) -> PairKey {
    PairKey {
        database: "Sales".into(),
        schema: "dbo".into(),
        table: table.into(),
        column: column.into(),
        ref_server: "dwdb".into(),
        ref_database: "HR".into(),
        ref_table: "Employees".into(),
        ref_field: "SSN".into(),
    }
}

#[test]
fn existing_ledger_rows_survive_a_run() {
    let fleet = ssn_fleet();
    let config = fleet.config(&["Sales"]).with_overrides(None, None, Some(50_000));

    let seeded = {
        let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
        let catalog = SqliteCatalog::new(&session, &config.catalog, "earlier-run").unwrap();
        assert!(catalog.ensure_ledger().unwrap());
        catalog.record_processed(&pair("Customers", "Name"), "nvarchar(100)").unwrap();
        catalog.try_ledger_entries().unwrap()
    };
    assert_eq!(seeded.len(), 1);

    let summary = run_scan(&fleet.descriptor(), &config).unwrap();
    assert_eq!(summary.already_processed, 1);
    assert_eq!(summary.cleared, 0);
    assert_eq!(summary.sensitive, 1);

    let session = SqliteSession::open(&fleet.descriptor(), &config).unwrap();
    let catalog = SqliteCatalog::new(&session, &config.catalog, "reader").unwrap();
    let entries = catalog.try_ledger_entries().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], seeded[0]);
    assert_eq!(entries[0].run_id.as_deref(), Some("earlier-run"));
    assert_eq!(entries[0].status, LedgerStatus::Processed);

    let keys: Vec<PairKey> = entries.iter().map(|e| e.key.clone()).collect();
    assert!(keys.contains(&pair("Customers", "TaxID")));
    assert!(keys.contains(&pair("Customers", "Age")));
    assert!(entries.iter().skip(1).all(|e| e.run_id.as_deref() == Some(summary.run_id.as_str())));
}

#[test]
fn schemas_with_the_same_joined_name_are_scanned_separately() {
    let fleet = Fleet::new();
    fleet.add_reference("HR", "Employees", "SSN", "varchar");
    fleet.add_comparable("varchar", "varchar");
    fleet.add_comparable("varchar", "text");
    fleet.table_with_values("HR", "Employees", "SSN", "varchar(11)", &ssns(200));

    let mut leak = fleet.schema("Sales__x", "y");
    leak.execute_batch("CREATE TABLE Leak (TaxID varchar(11));").unwrap();
    let tx = leak.transaction().unwrap();
    for ssn in ssns(200) {
        tx.execute("INSERT INTO Leak VALUES (?1)", [ssn]).unwrap();
    }
    tx.commit().unwrap();
    fleet
        .schema("Sales", "x__y")
        .execute_batch("CREATE TABLE Other (Note text); INSERT INTO Other VALUES ('nothing here');")
        .unwrap();

    let config = fleet
        .config(&["Sales__x", "Sales"])
        .with_overrides(None, Some(50), Some(1_000));
    let summary = run_scan(&fleet.descriptor(), &config).unwrap();

    assert_eq!(summary.candidates_seen, 2);
    assert_eq!(summary.sensitive, 1);
    assert_eq!(summary.cleared, 1);
    assert_eq!(summary.sensitive_fields[0].candidate.qualified_name(), "Sales__x.y.Leak.TaxID");
    assert_eq!(summary.sensitive_fields[0].overlap, 200);
    assert_eq!(
        fleet.ledger_rows(),
        vec![
            ("Leak".to_string(), "TaxID".to_string(), "Sensitive".to_string()),
            ("Other".to_string(), "Note".to_string(), "Processed".to_string()),
        ]
    );
}
