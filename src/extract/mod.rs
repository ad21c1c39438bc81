// Record extraction: locate one INSERT statement, split its tuple list,
// filter the raw records. No SQL grammar, no schema knowledge.

pub mod fields;
pub mod insert;

pub use insert::{locate, split_records, SplitRecords, TupleList};

/// One element of an INSERT tuple list, borrowed from the dump buffer.
///
/// Records come straight out of a split on the literal delimiter `),(`, so
/// the first record of a statement keeps its leading `(` and the last keeps
/// its trailing `)`. Stripping those is the caller's job (see
/// [`RawRecord::trimmed`]); the extractor never rewrites record text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    raw: &'a str,
}

impl<'a> RawRecord<'a> {
    pub(crate) fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// The record text exactly as it appeared in the tuple list.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// The record text with at most one boundary parenthesis stripped from
    /// each end. Field extraction should run on this form.
    pub fn trimmed(&self) -> &'a str {
        let s = self.raw.trim();
        let s = s.strip_prefix('(').unwrap_or(s);
        s.strip_suffix(')').unwrap_or(s)
    }
}

/// Lazily select records matching `predicate`, preserving dump order.
/// No deduplication and no normalization of the record text.
pub fn filter<'a, I, P>(records: I, predicate: P) -> impl Iterator<Item = RawRecord<'a>>
where
    I: Iterator<Item = RawRecord<'a>>,
    P: FnMut(&RawRecord<'a>) -> bool,
{
    records.filter(predicate)
}

/// Substring predicates over record text. These stand in for structured
/// column access; they accept the false positives that come with that.
pub mod predicate {
    /// Record contains `needle` anywhere.
    pub fn contains(needle: &str) -> impl Fn(&str) -> bool {
        let needle = needle.to_string();
        move |record| record.contains(&needle)
    }

    /// Record contains `needle` within its first `limit` bytes. The window
    /// is backed off to a character boundary so multibyte text cannot panic.
    pub fn contains_within(needle: &str, limit: usize) -> impl Fn(&str) -> bool {
        let needle = needle.to_string();
        move |record| {
            let mut end = limit.min(record.len());
            while !record.is_char_boundary(end) {
                end -= 1;
            }
            record[..end].contains(&needle)
        }
    }

    /// Record's first field equals `value` (record starts with `value,`).
    pub fn leading_value(value: &str) -> impl Fn(&str) -> bool {
        let prefix = format!("{},", value);
        move |record| record.starts_with(&prefix)
    }

    /// Record holds `,value,` where the character after the trailing comma
    /// is not another digit. Approximates an exact match on a numeric
    /// column without parsing fields.
    pub fn bare_value(value: &str) -> impl Fn(&str) -> bool {
        let needle = format!(",{},", value);
        move |record| {
            for (pos, _) in record.match_indices(&needle) {
                match record.as_bytes().get(pos + needle.len()) {
                    Some(b) if b.is_ascii_digit() => continue,
                    _ => return true,
                }
            }
            false
        }
    }
}
