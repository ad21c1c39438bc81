// INSERT statement location and tuple-list splitting.
// Parsing stays deliberately naive: first statement only, literal `),(`
// delimiter, no handling of escaped quotes or nested parentheses.

use crate::extract::RawRecord;
use crate::logger;
use regex::Regex;

const RECORD_DELIMITER: &str = "),(";

/// The raw tuple list of one located INSERT statement, borrowed from the
/// dump buffer.
#[derive(Debug, Clone, Copy)]
pub struct TupleList<'a> {
    raw: &'a str,
}

impl<'a> TupleList<'a> {
    /// The tuple-list text between `VALUES ` and the terminating `;`.
    pub fn raw(&self) -> &'a str {
        self.raw
    }
}

/// Find the first ``INSERT INTO `table` VALUES …;`` statement for `table`
/// and return its tuple list, or `None` when the table has no INSERT.
///
/// The search is non-greedy and spans newlines, stopping at the first `;`.
/// If a table's rows are spread over several INSERT statements, the later
/// ones are silently ignored.
pub fn locate<'a>(dump: &'a str, table: &str) -> Option<TupleList<'a>> {
    let pattern = format!("(?s)INSERT INTO `{}` VALUES (.+?);", regex::escape(table));
    let re = Regex::new(&pattern).expect("valid insert locate regex");
    let caps = re.captures(dump)?;
    let raw = caps.get(1)?.as_str();
    logger::debug(&format!(
        "locate: `{}` tuple list is {} bytes",
        table,
        raw.len()
    ));
    Some(TupleList { raw })
}

/// Iterator over a tuple list's records, in dump order. Restartable via
/// `Clone`; pieces keep their statement-boundary parentheses (see
/// [`RawRecord`]).
#[derive(Clone)]
pub struct SplitRecords<'a> {
    inner: Option<std::str::Split<'a, &'static str>>,
}

/// Split a tuple list on the literal delimiter `),(`.
///
/// A zero-tuple statement (`VALUES ();`) yields no records; everything else
/// yields one record per tuple.
pub fn split_records<'a>(tuples: &TupleList<'a>) -> SplitRecords<'a> {
    let raw = tuples.raw().trim();
    let body = raw.strip_prefix('(').unwrap_or(raw);
    let body = body.strip_suffix(')').unwrap_or(body);
    let inner = if body.trim().is_empty() {
        None
    } else {
        Some(raw.split(RECORD_DELIMITER))
    };
    SplitRecords { inner }
}

impl<'a> Iterator for SplitRecords<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(RawRecord::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_returns_the_tuple_list() {
        let dump = "INSERT INTO `t` VALUES (1,'a'),(2,'b');";
        let tuples = locate(dump, "t").expect("statement present");
        assert_eq!(tuples.raw(), "(1,'a'),(2,'b')");
    }

    #[test]
    fn locate_missing_table_is_none() {
        // A larger haystack than the statement itself; absence must stay a
        // clean None, not an error.
        let mut dump = String::from("INSERT INTO `t` VALUES (1,'a');\n");
        dump.push_str(&"-- filler line with no statements\n".repeat(300));
        assert!(locate(&dump, "missing").is_none());
    }

    #[test]
    fn locate_spans_newlines() {
        let dump = "INSERT INTO `t` VALUES (1,'line\none'),\n(2,'b');";
        let tuples = locate(dump, "t").expect("statement present");
        assert!(tuples.raw().contains("line\none"));
        assert_eq!(split_records(&tuples).count(), 2);
    }

    #[test]
    fn locate_stops_at_the_first_statement() {
        let dump = "INSERT INTO `t` VALUES (1,'a');\nINSERT INTO `t` VALUES (2,'b');";
        let tuples = locate(dump, "t").expect("statement present");
        assert_eq!(tuples.raw(), "(1,'a')");
    }

    #[test]
    fn locate_escapes_regex_metacharacters_in_table_names() {
        let dump = "INSERT INTO `t.v2` VALUES (1);";
        assert!(locate(dump, "t.v2").is_some());
        assert!(locate(dump, "tXv2").is_none());
    }

    #[test]
    fn split_yields_every_tuple_in_order() {
        let dump = "INSERT INTO `t` VALUES (1,'a'),(2,'b'),(3,'c');";
        let tuples = locate(dump, "t").unwrap();
        let raws: Vec<&str> = split_records(&tuples).map(|r| r.raw()).collect();
        assert_eq!(raws, vec!["(1,'a'", "2,'b'", "3,'c')"]);
    }

    #[test]
    fn split_is_restartable_and_idempotent() {
        let dump = "INSERT INTO `t` VALUES (1,'a'),(2,'b');";
        let tuples = locate(dump, "t").unwrap();
        let records = split_records(&tuples);
        let first: Vec<&str> = records.clone().map(|r| r.raw()).collect();
        let second: Vec<&str> = records.map(|r| r.raw()).collect();
        assert_eq!(first, second);

        // A fresh locate over the same dump sees the same sequence.
        let again = locate(dump, "t").unwrap();
        let third: Vec<&str> = split_records(&again).map(|r| r.raw()).collect();
        assert_eq!(first, third);
    }

    #[test]
    fn zero_tuple_statement_yields_no_records() {
        let dump = "INSERT INTO `t` VALUES ();";
        let tuples = locate(dump, "t").expect("statement present");
        assert_eq!(split_records(&tuples).count(), 0);
    }

    #[test]
    fn single_tuple_keeps_both_boundary_parens() {
        let dump = "INSERT INTO `t` VALUES (1,'a');";
        let tuples = locate(dump, "t").unwrap();
        let raws: Vec<&str> = split_records(&tuples).map(|r| r.raw()).collect();
        assert_eq!(raws, vec!["(1,'a')"]);
    }

    #[test]
    fn commas_inside_quoted_strings_do_not_split_records() {
        // The delimiter is `),(`, so plain commas in values are safe; a
        // literal `),(` inside a string is a documented false split.
        let dump = "INSERT INTO `t` VALUES (1,'a,b'),(2,'c');";
        let tuples = locate(dump, "t").unwrap();
        let raws: Vec<&str> = split_records(&tuples).map(|r| r.raw()).collect();
        assert_eq!(raws, vec!["(1,'a,b'", "2,'c')"]);
    }
}
