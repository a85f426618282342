//! Human-readable tables for run summaries, reference lists and the ledger.

use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use std::io::Write;

use sensiscan_core::{LedgerEntry, RunSummary, SensitiveFieldReference};

use crate::ui::theme::{paint, ThemeEntry, ThemeMap};

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h)));
    table
}

/// Prints the counters of a run and, if any, the newly classified fields.
pub fn print_run_summary<W: Write>(
    summary: &RunSummary,
    writer: &mut W,
    theme: &ThemeMap,
    enable_colors: bool,
) -> Result<()> {
    writeln!(
        writer,
        "\n{}",
        paint(&format!("Discovery run {}", summary.run_id), ThemeEntry::Header, theme, enable_colors)
    )?;

    let mut counters = new_table(&["Outcome", "Pairs"]);
    for (label, count) in [
        ("References", summary.references as u64),
        ("Candidates seen", summary.candidates_seen),
        ("Already processed", summary.already_processed),
        ("Type incompatible", summary.type_incompatible),
        ("Cleared", summary.cleared),
        ("Sensitive", summary.sensitive),
        ("Ledger write failures", summary.ledger_failures),
    ] {
        counters.add_row(vec![
            Cell::new(label),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    writeln!(writer, "{}", counters)?;

    if summary.sensitive_fields.is_empty() {
        writeln!(
            writer,
            "{}",
            paint("No new sensitive fields found.", ThemeEntry::Success, theme, enable_colors)
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "{}",
        paint("New sensitive fields:", ThemeEntry::Sensitive, theme, enable_colors)
    )?;
    let mut findings = new_table(&["Field", "Type", "Matches reference", "Overlap"]);
    for finding in &summary.sensitive_fields {
        findings.add_row(vec![
            Cell::new(finding.candidate.qualified_name()),
            Cell::new(&finding.candidate.data_type),
            Cell::new(&finding.reference),
            Cell::new(finding.overlap).set_alignment(CellAlignment::Right),
        ]);
    }
    writeln!(writer, "{}", findings)?;
    Ok(())
}

pub fn print_references<W: Write>(references: &[SensitiveFieldReference], writer: &mut W) -> Result<()> {
    let mut table = new_table(&["Server", "Database", "Table", "Field", "Type", "Status"]);
    for r in references {
        table.add_row(vec![
            Cell::new(&r.server),
            Cell::new(&r.database),
            Cell::new(&r.table),
            Cell::new(&r.field),
            Cell::new(&r.data_type),
            Cell::new(r.status.as_deref().unwrap_or("")),
        ]);
    }
    writeln!(writer, "{}", table)?;
    writeln!(writer, "{} reference fields", references.len())?;
    Ok(())
}

pub fn print_ledger<W: Write>(entries: &[LedgerEntry], writer: &mut W) -> Result<()> {
    let mut table = new_table(&["Field", "Reference", "Type", "Status", "Processed at"]);
    for e in entries {
        let k = &e.key;
        table.add_row(vec![
            Cell::new(format!("{}.{}.{}.{}", k.database, k.schema, k.table, k.column)),
            Cell::new(format!("{}.{}.{}", k.ref_database, k.ref_table, k.ref_field)),
            Cell::new(e.data_type.as_deref().unwrap_or("")),
            Cell::new(e.status),
            Cell::new(&e.processed_at),
        ]);
    }
    writeln!(writer, "{}", table)?;
    writeln!(writer, "{} ledger rows", entries.len())?;
    Ok(())
}
