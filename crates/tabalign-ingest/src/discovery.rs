//! Source file discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// CSV files directly inside `dir`, ordered by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let read_error = |source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_file() && has_csv_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Expands directories into their CSV files; other paths are kept as given.
///
/// Input order is preserved, which fixes table ids and tie-breaking.
pub fn expand_sources<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for source in sources {
        let source = source.as_ref();
        if source.is_dir() {
            let found = list_csv_files(source)?;
            debug!(dir = %source.display(), files = found.len(), "directory expanded");
            files.extend(found);
        } else {
            files.push(source.to_path_buf());
        }
    }
    Ok(files)
}

/// True when `location` carries a URL scheme such as `https://`.
pub fn is_remote_location(location: &str) -> bool {
    location
        .split_once("://")
        .is_some_and(|(scheme, _)| {
            !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["weather.CSV", "states.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "a\n1\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("archive.csv")).unwrap();
        dir
    }

    #[test]
    fn lists_csv_files_by_name() {
        let dir = source_dir();
        let files = list_csv_files(dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("states.csv"));
        assert!(files[1].ends_with("weather.CSV"));
    }

    #[test]
    fn file_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("test.csv");
        std::fs::write(&file_path, "data").unwrap();

        let result = list_csv_files(&file_path);
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }

    #[test]
    fn expanded_sources_keep_order() {
        let dir = source_dir();
        let single = dir.path().join("zeta.csv");
        std::fs::write(&single, "a\n1").unwrap();

        let files = expand_sources(&[single.clone(), dir.path().to_path_buf()]).unwrap();
        assert_eq!(files[0], single);
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn url_schemes_are_remote() {
        assert!(is_remote_location("https://example.org/data.csv"));
        assert!(is_remote_location("s3://bucket/key.csv"));
        assert!(!is_remote_location("data/weather.csv"));
        assert!(!is_remote_location("C:\\data\\weather.csv"));
    }
}
