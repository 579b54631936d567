//! Error types for hydromet-zones.

use std::path::{Path, PathBuf};

/// Error type for all fallible operations in the hydromet-zones crate.
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a file cannot be read or its content is malformed.
    #[error("cannot read {}{}: {reason}", path.display(), line_suffix(*line))]
    FileRead {
        /// File being read.
        path: PathBuf,
        /// 1-based line number, when the failure is tied to one line.
        line: Option<usize>,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when a zone or parameter definition is inconsistent.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of the inconsistency.
        reason: String,
    },
}

impl ZoneError {
    /// Builds a [`ZoneError::FileRead`] tied to one line of `path`.
    pub fn at_line(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        ZoneError::FileRead {
            path: path.to_path_buf(),
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ZoneError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ZoneError::FileRead {
                path: path.to_path_buf(),
                line: None,
                reason: err.to_string(),
            }
        }
    }
}

/// Formats an optional line number as `" (line N)"`.
pub fn line_suffix(line: Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_read_with_line() {
        let err = ZoneError::at_line(Path::new("/data/zones.csv"), 7, "bad altitude");
        assert_eq!(
            err.to_string(),
            "cannot read /data/zones.csv (line 7): bad altitude"
        );
    }

    #[test]
    fn display_file_read_without_line() {
        let err = ZoneError::FileRead {
            path: PathBuf::from("/data/zones.csv"),
            line: None,
            reason: "permission denied".to_string(),
        };
        assert_eq!(err.to_string(), "cannot read /data/zones.csv: permission denied");
    }

    #[test]
    fn io_not_found_maps_to_file_not_found() {
        let err = ZoneError::io(
            Path::new("/nope"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, ZoneError::FileNotFound { .. }));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<ZoneError>();
    }
}
