// Heuristic field extraction tuned to the legacy record layouts this tool
// was written against. The patterns are fragile on purpose; hardening them
// would change which fields get reported. Absence is the only failure mode.

use regex::Regex;

pub struct FieldExtractor {
    leading_id_re: Regex,
    email_re: Regex,
    name_pair_re: Regex,
}

impl FieldExtractor {
    // Build the patterns once for reuse across records.
    pub fn new() -> Self {
        let leading_id_re = Regex::new(r"^(\d+),").expect("valid leading id regex");
        let email_re = Regex::new(r"'([^']*@[^']*)'").expect("valid email regex");
        let name_pair_re =
            Regex::new(r",'([^']*?)','([^']*?)',[\d.]+,").expect("valid name pair regex");
        Self {
            leading_id_re,
            email_re,
            name_pair_re,
        }
    }

    /// The record's first field, when it is a bare unsigned integer.
    pub fn leading_id<'a>(&self, record: &'a str) -> Option<&'a str> {
        self.leading_id_re
            .captures(record)?
            .get(1)
            .map(|m| m.as_str())
    }

    /// The first quoted value containing an `@`.
    pub fn email<'a>(&self, record: &'a str) -> Option<&'a str> {
        self.email_re.captures(record)?.get(1).map(|m| m.as_str())
    }

    /// Two adjacent quoted fields directly before a numeric field. In the
    /// legacy layout those are the first/last name columns.
    pub fn name_pair<'a>(&self, record: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.name_pair_re.captures(record)?;
        match (caps.get(1), caps.get(2)) {
            (Some(first), Some(last)) => Some((first.as_str(), last.as_str())),
            _ => None,
        }
    }

    /// Index into the record by splitting on the literal `','`. Only sound
    /// for layouts whose string fields are contiguous with no embedded
    /// quote escaping, and the outermost pieces keep stray punctuation from
    /// the record boundary.
    pub fn quoted_field<'a>(&self, record: &'a str, index: usize) -> Option<&'a str> {
        record.split("','").nth(index)
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}
