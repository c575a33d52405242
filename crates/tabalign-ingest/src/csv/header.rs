//! CSV header parsing and normalization.

use std::collections::HashSet;

/// Header row of a source table after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHeaders {
    /// Trimmed, non-empty and unique column names, in file order.
    pub columns: Vec<String>,
    /// Field delimiter detected for the file.
    pub delimiter: u8,
}

impl CsvHeaders {
    pub fn new(columns: Vec<String>, delimiter: u8) -> Self {
        Self { columns, delimiter }
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Normalizes a header value by trimming whitespace and a leading BOM.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}

/// Makes every header addressable.
///
/// Empty names become `column_<n>` (1-based position); repeated names get a
/// `_<k>` suffix starting at 2.
pub fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut columns = Vec::with_capacity(raw.len());
    for (idx, value) in raw.iter().enumerate() {
        let base = match normalize_header(value) {
            name if name.is_empty() => format!("column_{}", idx + 1),
            name => name,
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while seen.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        columns.push(name);
    }
    columns
}
