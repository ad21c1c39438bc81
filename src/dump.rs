// Dump file handling: whole-file loading with permissive decoding, plus a
// streaming survey of INSERT targets for large dumps.

use crate::logger;
use ahash::AHashMap;
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};

/// Full contents of a dump file, decoded once and never mutated.
pub struct DumpText {
    text: String,
}

impl DumpText {
    // Read the whole dump into memory. Dumps from old hosting providers are
    // not always clean UTF-8; bad bytes are replaced instead of aborting.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        logger::debug(&format!("DumpText: reading {}", path));
        let bytes = fs::read(path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                logger::warn(&format!(
                    "DumpText: {} contains invalid UTF-8, substituting U+FFFD",
                    path
                ));
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        logger::debug(&format!("DumpText: {} bytes loaded", text.len()));
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// One INSERT target found by [`TableSurvey::scan`], with its statement count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: String,
    pub statements: usize,
}

// Streaming scan for INSERT targets. Works line by line so surveying a
// multi-gigabyte dump does not require loading it.
pub struct TableSurvey {
    insert_re: Regex,
}

impl TableSurvey {
    pub fn new() -> Self {
        let insert_re = Regex::new(r"(?i)^INSERT\s+INTO\s+`([^`]+)`\s+VALUES\b")
            .expect("valid insert survey regex");
        Self { insert_re }
    }

    // Count INSERT statements per table, in order of first appearance.
    pub fn scan(
        &self,
        path: &str,
        bar: Option<&indicatif::ProgressBar>,
    ) -> Result<Vec<TableCount>, Box<dyn std::error::Error + Send + Sync>> {
        logger::debug(&format!("TableSurvey: scanning {}", path));
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut order: Vec<String> = Vec::new();
        let mut counts: AHashMap<String, usize> = AHashMap::new();

        // read_until instead of read_line: lines with invalid UTF-8 must not
        // abort the scan.
        let mut buf: Vec<u8> = Vec::new();
        let mut bytes_read: u64 = 0;
        let mut last_logged: u64 = 0;
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            bytes_read += n as u64;
            if let Some(b) = bar {
                b.inc(n as u64);
            } else if logger::is_debug() && bytes_read - last_logged > 100 * 1024 * 1024 {
                logger::debug(&format!(
                    "TableSurvey: {} bytes read from {}",
                    bytes_read, path
                ));
                last_logged = bytes_read;
            }
            let line = String::from_utf8_lossy(&buf);
            if let Some(cap) = self.insert_re.captures(&line) {
                if let Some(table) = cap.get(1) {
                    let name = table.as_str().to_string();
                    match counts.get_mut(&name) {
                        Some(count) => *count += 1,
                        None => {
                            counts.insert(name.clone(), 1);
                            order.push(name);
                        }
                    }
                }
            }
        }

        if let Some(b) = bar {
            b.finish();
        }

        logger::debug(&format!(
            "TableSurvey: found {} tables with INSERT statements",
            order.len()
        ));

        Ok(order
            .into_iter()
            .map(|table| {
                let statements = counts.get(&table).copied().unwrap_or(0);
                TableCount { table, statements }
            })
            .collect())
    }
}

impl Default for TableSurvey {
    fn default() -> Self {
        Self::new()
    }
}
