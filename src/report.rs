// Reporting layer: renders extraction results and writes export files.
// Kept apart from the extractor so the hard part stays pure and testable.

use crate::extract::fields::FieldExtractor;
use crate::logger;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};

/// Heuristically extracted fields of one matching record. Empty strings
/// mean the pattern did not match; the raw text is kept for manual review.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub old_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RecordSummary {
    pub fn from_record(fx: &FieldExtractor, record: &str) -> Self {
        let (first_name, last_name) = match fx.name_pair(record) {
            Some((first, last)) => (first.to_string(), last.to_string()),
            None => (String::new(), String::new()),
        };
        Self {
            old_id: fx.leading_id(record).unwrap_or_default().to_string(),
            email: fx.email(record).unwrap_or_default().to_string(),
            first_name,
            last_name,
        }
    }
}

/// Outcome of counting matching rows in one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    pub located: bool,
    pub records: usize,
    pub matches: usize,
}

// List extracted summaries, capped at `limit` entries.
pub fn render_summaries<W: Write>(
    out: &mut W,
    summaries: &[RecordSummary],
    limit: usize,
) -> io::Result<()> {
    for s in summaries.iter().take(limit) {
        writeln!(
            out,
            "  ID {}: {} {} <{}>",
            s.old_id, s.first_name, s.last_name, s.email
        )?;
    }
    if summaries.len() > limit {
        writeln!(out, "  ... and {} more", summaries.len() - limit)?;
    }
    Ok(())
}

// List raw record snippets, capped at `limit` entries.
pub fn render_records<W: Write>(out: &mut W, records: &[&str], limit: usize) -> io::Result<()> {
    for record in records.iter().take(limit) {
        writeln!(out, "  {}", snippet(record, 120))?;
    }
    if records.len() > limit {
        writeln!(out, "  ... and {} more", records.len() - limit)?;
    }
    Ok(())
}

// Per-table count lines for the report command.
pub fn render_table_reports<W: Write>(out: &mut W, reports: &[TableReport]) -> io::Result<()> {
    for r in reports {
        if !r.located {
            writeln!(out, "{}: no INSERT statement found", r.table)?;
        } else {
            writeln!(out, "{}: {} of {} rows matched", r.table, r.matches, r.records)?;
        }
    }
    Ok(())
}

/// Build the commented SQL stub summarizing matching rows per table.
/// The stub is a starting point for a hand-written migration, not
/// executable SQL.
pub fn build_stub(dump_path: &str, reports: &[TableReport]) -> String {
    let mut out = String::new();
    out.push_str("-- Migration data summary\n");
    out.push_str(&format!("-- Source dump: {}\n\n", dump_path));
    for r in reports {
        if !r.located {
            out.push_str(&format!("-- {}: no INSERT statement found\n\n", r.table));
            continue;
        }
        out.push_str(&format!(
            "-- {}: found {} matching rows (of {})\n",
            r.table, r.matches, r.records
        ));
        out.push_str("-- NOTE: manual review and transformation needed\n\n");
    }
    out
}

pub fn write_stub(
    path: &str,
    dump_path: &str,
    reports: &[TableReport],
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let stub = build_stub(dump_path, reports);
    fs::write(path, &stub)?;
    logger::debug(&format!("report: stub written to {}", path));
    Ok(stub)
}

pub fn write_json(
    path: &str,
    summaries: &[RecordSummary],
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let json = serde_json::to_string_pretty(summaries)?;
    fs::write(path, json)?;
    logger::debug(&format!(
        "report: {} summaries written to {}",
        summaries.len(),
        path
    ));
    Ok(())
}

// Truncate long record text for terminal listing, on a char boundary.
pub fn snippet(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str) -> RecordSummary {
        RecordSummary {
            old_id: id.to_string(),
            email: format!("u{}@x.com", id),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
        }
    }

    #[test]
    fn from_record_extracts_the_legacy_layout() {
        let fx = FieldExtractor::new();
        let s = RecordSummary::from_record(&fx, "7,'john@x.com','John','Doe',10.5,");
        assert_eq!(s.old_id, "7");
        assert_eq!(s.email, "john@x.com");
        assert_eq!(s.first_name, "John");
        assert_eq!(s.last_name, "Doe");
    }

    #[test]
    fn from_record_leaves_absent_fields_empty() {
        let fx = FieldExtractor::new();
        let s = RecordSummary::from_record(&fx, "'not','numeric'");
        assert_eq!(s.old_id, "");
        assert_eq!(s.email, "");
        assert_eq!(s.first_name, "");
    }

    #[test]
    fn render_summaries_caps_the_listing() {
        let summaries: Vec<RecordSummary> = (0..12).map(|i| summary(&i.to_string())).collect();
        let mut out = Vec::new();
        render_summaries(&mut out, &summaries, 10).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 11);
        assert!(text.contains("... and 2 more"));
    }

    #[test]
    fn stub_reports_each_table() {
        let reports = vec![
            TableReport {
                table: "invoices".to_string(),
                located: true,
                records: 40,
                matches: 3,
            },
            TableReport {
                table: "payments".to_string(),
                located: false,
                records: 0,
                matches: 0,
            },
        ];
        let stub = build_stub("old.sql", &reports);
        assert!(stub.starts_with("-- Migration data summary"));
        assert!(stub.contains("-- Source dump: old.sql"));
        assert!(stub.contains("-- invoices: found 3 matching rows (of 40)"));
        assert!(stub.contains("-- payments: no INSERT statement found"));
    }

    #[test]
    fn snippet_truncates_on_char_boundaries() {
        assert_eq!(snippet("short", 120), "short");
        let long = "é".repeat(80);
        let cut = snippet(&long, 99);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 102);
    }

    #[test]
    fn write_json_exports_all_summaries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let summaries = vec![summary("1"), summary("2")];
        write_json(path.to_str().unwrap(), &summaries).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("u1@x.com"));
        assert!(text.contains("u2@x.com"));
    }
}
