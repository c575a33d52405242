//! CSV file reading with a sniffed delimiter.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

use super::header::{CsvHeaders, dedupe_headers, normalize_header};
use super::sniff::{SNIFF_SAMPLE_BYTES, sniff_delimiter};

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Detect encoding and validate it's supported (UTF-8 only).
///
/// Checks for UTF-16 BOM markers which are not supported.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = open(path)?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        let encoding = match buffer {
            [0xFF, 0xFE] => Some("UTF-16 LE"),
            [0xFE, 0xFF] => Some("UTF-16 BE"),
            _ => None,
        };
        if let Some(encoding) = encoding {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding,
            });
        }
    }

    // UTF-8 BOM is acceptable (stripped from the first header)
    Ok(())
}

/// Reads leading lines until roughly [`SNIFF_SAMPLE_BYTES`] have been seen.
fn read_sample_lines(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(open(path)?);
    let mut lines = Vec::new();
    let mut bytes = 0usize;

    for line_result in reader.lines() {
        let line = line_result.map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        bytes += line.len() + 1;
        let cleaned = line.strip_prefix('\u{feff}').unwrap_or(&line).to_string();
        lines.push(cleaned);
        if bytes >= SNIFF_SAMPLE_BYTES {
            break;
        }
    }

    Ok(lines)
}

/// Reads and normalizes the header row, sniffing the delimiter first.
pub fn read_csv_schema(path: &Path) -> Result<CsvHeaders> {
    validate_encoding(path)?;
    let sample = read_sample_lines(path)?;
    if sample.iter().all(|line| line.trim().is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    let delimiter = sniff_delimiter(&sample);

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(open(path)?);
    let raw: Vec<String> = reader
        .headers()
        .map_err(|source| IngestError::HeaderParse {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(str::to_string)
        .collect();
    if raw.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let columns = dedupe_headers(&raw);
    for (original, column) in raw.iter().zip(&columns) {
        if normalize_header(original) != *column {
            warn!(
                path = %path.display(),
                header = %original,
                renamed = %column,
                "empty or duplicate header renamed"
            );
        }
    }
    debug!(
        path = %path.display(),
        delimiter = %char::from(delimiter).escape_default(),
        columns = columns.len(),
        "headers read"
    );

    Ok(CsvHeaders::new(columns, delimiter))
}

/// Reads a CSV file into a Polars DataFrame using previously read headers.
///
/// The frame's column names are replaced by the normalized header names.
/// Column types are inferred over every row, so a column that turns textual
/// late in the file is read as text.
pub fn read_csv_table(path: &Path, headers: &CsvHeaders) -> Result<DataFrame> {
    let separator = headers.delimiter;
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|options| options.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.width() != headers.len() {
        return Err(IngestError::CsvParse {
            path: path.to_path_buf(),
            message: format!(
                "expected {} columns from the header row, found {}",
                headers.len(),
                df.width()
            ),
        });
    }
    df.set_column_names(headers.columns.iter().map(String::as_str))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(df)
}
