//! CSV reading utilities.

mod header;
mod reader;
mod sniff;

pub use header::{CsvHeaders, dedupe_headers};
pub use reader::{read_csv_schema, read_csv_table};
pub use sniff::{DELIMITER_CANDIDATES, sniff_delimiter};
