// sqldumpgrep: pull rows out of a MySQL dump file by pattern matching.
// One INSERT statement is located per table, its tuple list split on the
// literal `),(` delimiter, and the records filtered with substring
// predicates. There is deliberately no SQL parser behind any of this.

mod dump;
mod extract;
mod logger;
mod progress;
mod report;

use clap::{CommandFactory, Parser, Subcommand};
use dump::{DumpText, TableSurvey};
use extract::fields::FieldExtractor;
use extract::predicate;
use report::{RecordSummary, TableReport};
use std::io::{self, Write};

// Command-line flags and subcommands.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable debug logging (disables progress bars).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print records of one table matching the given predicates.
    Scan {
        /// Dump file path.
        dump: String,

        /// Table whose INSERT statement to search.
        table: String,

        /// Match records containing this substring (repeatable, OR-combined).
        #[arg(long)]
        contains: Vec<String>,

        /// Restrict --contains matches to the first N bytes of a record.
        #[arg(long)]
        within: Option<usize>,

        /// Match records whose first field equals this value.
        #[arg(long)]
        leading_id: Option<String>,

        /// Match records holding this value as a bare numeric field.
        #[arg(long)]
        bare_ref: Option<String>,

        /// Maximum records to list (counts are always complete).
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Render heuristic id/name/email fields instead of raw records.
        #[arg(long)]
        fields: bool,

        /// Print the Nth quote-delimited field of each match.
        #[arg(long, conflicts_with = "fields")]
        field: Option<usize>,

        /// Write extracted fields of all matches to a JSON file.
        #[arg(long)]
        json: Option<String>,
    },

    /// Count matching rows across several tables.
    Report {
        /// Dump file path.
        dump: String,

        /// TABLE or TABLE=VALUE; with a VALUE, count rows holding it as a
        /// bare numeric field.
        #[arg(long = "table", required = true)]
        tables: Vec<String>,

        /// Test `,VALUE,` within the first N bytes instead of a bare match.
        #[arg(long)]
        within: Option<usize>,
    },

    /// Write a commented SQL stub summarizing matching rows per table.
    Stub {
        /// Dump file path.
        dump: String,

        /// Output SQL file.
        out: String,

        /// TABLE or TABLE=VALUE, as for report.
        #[arg(long = "table", required = true)]
        tables: Vec<String>,

        /// Test `,VALUE,` within the first N bytes instead of a bare match.
        #[arg(long)]
        within: Option<usize>,
    },

    /// List INSERT targets appearing in the dump.
    Tables {
        /// Dump file path.
        dump: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if std::env::args().len() == 1 {
        Args::command().print_help()?;
        eprintln!();
        std::process::exit(1);
    }
    let args = Args::parse();

    logger::set_debug(args.debug);

    // Progress bars are disabled in debug mode to avoid mangled output.
    let progress = progress::ProgressManager::new(!args.debug);

    match args.command {
        Command::Scan {
            dump,
            table,
            contains,
            within,
            leading_id,
            bare_ref,
            limit,
            fields,
            field,
            json,
        } => run_scan(
            &dump,
            &table,
            &contains,
            within,
            leading_id.as_deref(),
            bare_ref.as_deref(),
            limit,
            fields,
            field,
            json.as_deref(),
        ),
        Command::Report {
            dump,
            tables,
            within,
        } => run_report(&dump, &tables, within, &progress),
        Command::Stub {
            dump,
            out,
            tables,
            within,
        } => run_stub(&dump, &out, &tables, within, &progress),
        Command::Tables { dump } => run_tables(&dump, &progress),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    dump_path: &str,
    table: &str,
    contains: &[String],
    within: Option<usize>,
    leading_id: Option<&str>,
    bare_ref: Option<&str>,
    limit: usize,
    fields: bool,
    field: Option<usize>,
    json: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let text = DumpText::load(dump_path)?;

    let Some(tuples) = extract::locate(text.as_str(), table) else {
        println!("No INSERT statement found for `{}`", table);
        return Ok(());
    };

    let predicates = build_predicates(contains, within, leading_id, bare_ref);
    let records = extract::split_records(&tuples);
    let total = records.clone().count();
    let matches: Vec<extract::RawRecord> = extract::filter(records, |r| {
        predicates.is_empty() || predicates.iter().any(|p| p(r.trimmed()))
    })
    .collect();
    logger::debug(&format!(
        "scan: {} of {} records matched in `{}`",
        matches.len(),
        total,
        table
    ));

    let fx = FieldExtractor::new();
    let summaries: Vec<RecordSummary> = matches
        .iter()
        .map(|r| RecordSummary::from_record(&fx, r.trimmed()))
        .collect();

    let mut stdout = io::stdout();
    if fields {
        report::render_summaries(&mut stdout, &summaries, limit)?;
    } else if let Some(index) = field {
        for record in matches.iter().take(limit) {
            let value = fx
                .quoted_field(record.trimmed(), index)
                .unwrap_or("<absent>");
            writeln!(stdout, "  {}", value)?;
        }
        if matches.len() > limit {
            writeln!(stdout, "  ... and {} more", matches.len() - limit)?;
        }
    } else {
        let trimmed: Vec<&str> = matches.iter().map(|r| r.trimmed()).collect();
        report::render_records(&mut stdout, &trimmed, limit)?;
    }

    if let Some(path) = json {
        report::write_json(path, &summaries)?;
    }

    print_summary(&mut stdout, &[("Records", total), ("Matches", matches.len())])?;
    Ok(())
}

fn run_report(
    dump_path: &str,
    specs: &[String],
    within: Option<usize>,
    progress: &progress::ProgressManager,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let text = DumpText::load(dump_path)?;
    let reports = count_tables(&text, specs, within, progress);

    let mut stdout = io::stdout();
    report::render_table_reports(&mut stdout, &reports)?;

    let located = reports.iter().filter(|r| r.located).count();
    let matches: usize = reports.iter().map(|r| r.matches).sum();
    print_summary(
        &mut stdout,
        &[
            ("Tables", reports.len()),
            ("Located", located),
            ("Matches", matches),
        ],
    )?;
    Ok(())
}

fn run_stub(
    dump_path: &str,
    out_path: &str,
    specs: &[String],
    within: Option<usize>,
    progress: &progress::ProgressManager,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let text = DumpText::load(dump_path)?;
    let reports = count_tables(&text, specs, within, progress);

    let stub = report::write_stub(out_path, dump_path, &reports)?;
    let mut stdout = io::stdout();
    write!(stdout, "{}", stub)?;
    writeln!(stdout, "Stub saved to: {}", out_path)?;
    Ok(())
}

fn run_tables(
    dump_path: &str,
    progress: &progress::ProgressManager,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let survey = TableSurvey::new();
    let bar = progress.new_file_bar(dump_path, "Scanning dump");
    let counts = survey.scan(dump_path, bar.as_ref())?;

    let mut stdout = io::stdout();
    if counts.is_empty() {
        writeln!(stdout, "No INSERT statements found")?;
        return Ok(());
    }
    for c in &counts {
        writeln!(stdout, "{:<40} {} statement(s)", c.table, c.statements)?;
    }
    print_summary(&mut stdout, &[("Tables", counts.len())])?;
    Ok(())
}

// Build the OR-combined predicate set for scan. All predicates run over
// boundary-trimmed record text.
fn build_predicates(
    contains: &[String],
    within: Option<usize>,
    leading_id: Option<&str>,
    bare_ref: Option<&str>,
) -> Vec<Box<dyn Fn(&str) -> bool>> {
    let mut predicates: Vec<Box<dyn Fn(&str) -> bool>> = Vec::new();
    for needle in contains {
        match within {
            Some(limit) => predicates.push(Box::new(predicate::contains_within(needle, limit))),
            None => predicates.push(Box::new(predicate::contains(needle))),
        }
    }
    if let Some(value) = leading_id {
        predicates.push(Box::new(predicate::leading_value(value)));
    }
    if let Some(value) = bare_ref {
        predicates.push(Box::new(predicate::bare_value(value)));
    }
    predicates
}

fn count_tables(
    text: &DumpText,
    specs: &[String],
    within: Option<usize>,
    progress: &progress::ProgressManager,
) -> Vec<TableReport> {
    let bar = progress.new_count_bar(specs.len() as u64, "Checking tables");
    let mut reports = Vec::new();
    for spec in specs {
        let (table, needle) = parse_table_spec(spec);
        let entry = match extract::locate(text.as_str(), &table) {
            None => {
                logger::warn(&format!("report: no INSERT statement for `{}`", table));
                TableReport {
                    table,
                    located: false,
                    records: 0,
                    matches: 0,
                }
            }
            Some(tuples) => {
                let records = extract::split_records(&tuples);
                let total = records.clone().count();
                let matched = match needle.as_deref() {
                    None => total,
                    Some(value) => {
                        let pred = match_predicate(value, within);
                        extract::filter(records, |r| pred(r.trimmed())).count()
                    }
                };
                TableReport {
                    table,
                    located: true,
                    records: total,
                    matches: matched,
                }
            }
        };
        if let Some(b) = &bar {
            b.inc(1);
        }
        reports.push(entry);
    }
    if let Some(b) = &bar {
        b.finish();
    }
    reports
}

// TABLE or TABLE=VALUE.
fn parse_table_spec(spec: &str) -> (String, Option<String>) {
    match spec.split_once('=') {
        Some((table, value)) => (table.to_string(), Some(value.to_string())),
        None => (spec.to_string(), None),
    }
}

// Bare numeric match by default; a --within window turns it into a plain
// prefix-window substring test.
fn match_predicate(value: &str, within: Option<usize>) -> Box<dyn Fn(&str) -> bool> {
    match within {
        Some(limit) => Box::new(predicate::contains_within(&format!(",{},", value), limit)),
        None => Box::new(predicate::bare_value(value)),
    }
}

// Print the closing summary block.
fn print_summary<W: Write>(out: &mut W, rows: &[(&str, usize)]) -> io::Result<()> {
    let sep = "=".repeat(60);
    writeln!(out, "\n{}\nSUMMARY\n{}", sep, sep)?;
    for (label, value) in rows {
        writeln!(out, "{:<9} {}", format!("{}:", label), value)?;
    }
    writeln!(out, "{}", sep)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_specs_split_on_the_first_equals() {
        assert_eq!(parse_table_spec("users"), ("users".to_string(), None));
        assert_eq!(
            parse_table_spec("invoices=2"),
            ("invoices".to_string(), Some("2".to_string()))
        );
        assert_eq!(
            parse_table_spec("t=a=b"),
            ("t".to_string(), Some("a=b".to_string()))
        );
    }

    #[test]
    fn scan_predicates_or_combine() {
        let predicates = build_predicates(
            &["@x.com".to_string()],
            None,
            Some("2"),
            None,
        );
        assert_eq!(predicates.len(), 2);
        assert!(predicates.iter().any(|p| p("2,'a','b'")));
        assert!(predicates.iter().any(|p| p("9,'z@x.com'")));
        assert!(!predicates.iter().any(|p| p("9,'plain'")));
    }
}
