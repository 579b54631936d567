//! Error types for hydromet-correction.

use std::path::{Path, PathBuf};

use hydromet_zones::line_suffix;

/// Error type for all fallible operations in the hydromet-correction crate.
#[derive(Debug, thiserror::Error)]
pub enum CorrectionError {
    /// Returned when the correction file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a correction row is malformed or fails validation.
    #[error("cannot read {}{}: {reason}", path.display(), line_suffix(*line))]
    FileRead {
        /// Correction file.
        path: PathBuf,
        /// 1-based line number, when the failure is tied to one line.
        line: Option<usize>,
        /// Description of the failure.
        reason: String,
    },
}

impl CorrectionError {
    /// Builds a [`CorrectionError::FileRead`] tied to one line of `path`.
    pub fn at_line(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        CorrectionError::FileRead {
            path: path.to_path_buf(),
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CorrectionError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CorrectionError::FileRead {
                path: path.to_path_buf(),
                line: None,
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_line() {
        let err = CorrectionError::at_line(Path::new("c.csv"), 9, "start after end");
        assert_eq!(err.to_string(), "cannot read c.csv (line 9): start after end");
    }

    #[test]
    fn display_file_not_found() {
        let err = CorrectionError::FileNotFound {
            path: PathBuf::from("/tmp/none.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/none.csv");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<CorrectionError>();
    }
}
