//! Arena of source tables with lazy, read-once loading.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tabalign_model::{TableHeaders, TableId};
use tracing::{debug, info};

use crate::csv::{CsvHeaders, read_csv_schema, read_csv_table};
use crate::discovery::is_remote_location;
use crate::error::{IngestError, Result};

/// Lifecycle of a table's data within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Headers known, rows not read yet.
    Unloaded,
    /// Rows are cached in memory.
    Loaded,
    /// Rows were read and released; reading again is refused.
    Evicted,
}

#[derive(Debug)]
enum Frame {
    Unloaded,
    Loaded(DataFrame),
    Evicted,
}

/// One source table: location, short name, headers and cached rows.
#[derive(Debug)]
pub struct SourceTable {
    id: TableId,
    location: PathBuf,
    name: String,
    headers: CsvHeaders,
    frame: Frame,
}

impl SourceTable {
    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Short name, unique within the store.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.headers.columns
    }

    pub fn delimiter(&self) -> u8 {
        self.headers.delimiter
    }

    pub fn state(&self) -> TableState {
        match self.frame {
            Frame::Unloaded => TableState::Unloaded,
            Frame::Loaded(_) => TableState::Loaded,
            Frame::Evicted => TableState::Evicted,
        }
    }
}

/// Derives a short table name from a file stem, unique among `taken`.
fn short_name(location: &Path, taken: &HashSet<String>) -> String {
    let stem = location
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("table");
    let mut name = stem.to_string();
    let mut suffix = 2;
    while taken.contains(&name) {
        name = format!("{stem}_{suffix}");
        suffix += 1;
    }
    name
}

/// Source tables of one run, indexed by [`TableId`] in input order.
///
/// Headers are read eagerly when the store is opened; rows are read on the
/// first [`TableStore::load`] and at most once.
#[derive(Debug, Default)]
pub struct TableStore {
    tables: Vec<SourceTable>,
    loads: usize,
}

impl TableStore {
    /// Reads the headers of every location. Fails on the first unreadable one.
    pub fn open<P: AsRef<Path>>(locations: &[P]) -> Result<Self> {
        let mut tables = Vec::with_capacity(locations.len());
        let mut taken = HashSet::new();
        for (index, location) in locations.iter().enumerate() {
            let location = location.as_ref();
            if let Some(text) = location.to_str()
                && is_remote_location(text)
            {
                return Err(IngestError::UnsupportedLocation {
                    location: text.to_string(),
                });
            }
            let headers = read_csv_schema(location)?;
            let name = short_name(location, &taken);
            taken.insert(name.clone());
            info!(
                table = %name,
                path = %location.display(),
                columns = headers.len(),
                "source table opened"
            );
            tables.push(SourceTable {
                id: TableId(index),
                location: location.to_path_buf(),
                name,
                headers,
                frame: Frame::Unloaded,
            });
        }
        Ok(Self { tables, loads: 0 })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, id: TableId) -> Option<&SourceTable> {
        self.tables.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceTable> {
        self.tables.iter()
    }

    /// Short name of a table, or `"?"` for an unknown id.
    pub fn name(&self, id: TableId) -> &str {
        self.get(id).map_or("?", SourceTable::name)
    }

    /// Header view of every table for matching and planning.
    pub fn headers(&self) -> Vec<TableHeaders> {
        self.tables
            .iter()
            .map(|table| TableHeaders {
                id: table.id,
                name: table.name.clone(),
                columns: table.headers.columns.clone(),
            })
            .collect()
    }

    /// Number of times table rows have been read from disk.
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Returns the rows of a table, reading them on first access.
    pub fn load(&mut self, id: TableId) -> Result<DataFrame> {
        let table = self
            .tables
            .get_mut(id.index())
            .ok_or(IngestError::UnknownTable { index: id.index() })?;
        match &table.frame {
            Frame::Loaded(df) => return Ok(df.clone()),
            Frame::Evicted => {
                return Err(IngestError::Evicted {
                    table: table.name.clone(),
                });
            }
            Frame::Unloaded => {}
        }
        let df = read_csv_table(&table.location, &table.headers)?;
        self.loads += 1;
        info!(table = %table.name, rows = df.height(), "table loaded");
        table.frame = Frame::Loaded(df.clone());
        Ok(df)
    }

    /// Releases a table's rows. Later loads of it fail.
    pub fn evict(&mut self, id: TableId) {
        if let Some(table) = self.tables.get_mut(id.index()) {
            debug!(table = %table.name, "table evicted");
            table.frame = Frame::Evicted;
        }
    }

    /// Releases every cached frame, e.g. after a failed run.
    pub fn clear(&mut self) {
        for table in &mut self.tables {
            if matches!(table.frame, Frame::Loaded(_)) {
                table.frame = Frame::Evicted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_names_are_unique() {
        let mut taken = HashSet::new();
        let first = short_name(Path::new("a/weather.csv"), &taken);
        taken.insert(first.clone());
        let second = short_name(Path::new("b/weather.csv"), &taken);
        assert_eq!(first, "weather");
        assert_eq!(second, "weather_2");
    }

    #[test]
    fn test_short_name_fallback() {
        assert_eq!(short_name(Path::new(".csv"), &HashSet::new()), ".csv");
        assert_eq!(short_name(Path::new("/"), &HashSet::new()), "table");
    }

    #[test]
    fn test_rejects_remote_location() {
        let result = TableStore::open(&["https://example.org/data.csv"]);
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedLocation { .. })
        ));
    }
}
