//! Result persistence.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tabalign_model::{AlignError, Result};
use tracing::info;

fn persist_error(path: &Path, message: impl std::fmt::Display) -> AlignError {
    AlignError::Persist {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Sibling path the result is staged at before it replaces `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result.csv".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

/// Writes `df` as comma-separated CSV with a header row.
///
/// The file is written next to `path` and renamed over it, so `path` either
/// holds the complete previous content or the complete new content.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| persist_error(path, e))?;
    }
    let staging = staging_path(path);
    let written = File::create(&staging)
        .map_err(|e| persist_error(path, e))
        .and_then(|mut file| {
            let mut df = df.clone();
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .finish(&mut df)
                .map_err(|e| persist_error(path, e))
        });
    if let Err(err) = written {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    fs::rename(&staging, path).map_err(|e| {
        let _ = fs::remove_file(&staging);
        persist_error(path, e)
    })?;
    info!(path = %path.display(), rows = df.height(), "result written");
    Ok(())
}
