//! Error types for hydromet-forecast.

use std::path::{Path, PathBuf};

use hydromet_zones::line_suffix;

/// Error type for all fallible operations in the hydromet-forecast crate.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// Returned when a required file (raster, `.grp`, parameters) is absent.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a file cannot be read or is malformed.
    #[error("cannot read {}{}: {reason}", path.display(), line_suffix(*line))]
    FileRead {
        /// File being read.
        path: PathBuf,
        /// 1-based line number, when the failure is tied to one line.
        line: Option<usize>,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when a cache file cannot be written.
    #[error("cannot write {}: {reason}", path.display())]
    FileWrite {
        /// File being written.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when the forecast setup is inconsistent.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of the inconsistency.
        reason: String,
    },

    /// Returned when cached or raster data disagree with the current setup.
    #[error("data integrity error: {reason}")]
    DataIntegrity {
        /// Description of the mismatch.
        reason: String,
    },

    /// Wraps an error from the hydromet-zones crate.
    #[error("zone error: {reason}")]
    Zone {
        /// Description of the underlying zone failure.
        reason: String,
    },
}

impl ForecastError {
    /// Builds a [`ForecastError::FileRead`] tied to one line of `path`.
    pub fn at_line(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        ForecastError::FileRead {
            path: path.to_path_buf(),
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// Builds a [`ForecastError::FileRead`] for `path` without a line.
    pub fn read(path: &Path, reason: impl Into<String>) -> Self {
        ForecastError::FileRead {
            path: path.to_path_buf(),
            line: None,
            reason: reason.into(),
        }
    }

    /// Wraps an I/O failure while reading `path`.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ForecastError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::read(path, err.to_string())
        }
    }

    /// Wraps an I/O failure while writing `path`.
    pub fn write(path: &Path, err: std::io::Error) -> Self {
        ForecastError::FileWrite {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

impl From<hydromet_zones::ZoneError> for ForecastError {
    fn from(e: hydromet_zones::ZoneError) -> Self {
        match e {
            hydromet_zones::ZoneError::FileNotFound { path } => ForecastError::FileNotFound { path },
            other => ForecastError::Zone {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_data_integrity() {
        let err = ForecastError::DataIntegrity {
            reason: "weights cover 3 zones, 4 simulated".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "data integrity error: weights cover 3 zones, 4 simulated"
        );
    }

    #[test]
    fn display_file_read_with_line() {
        let err = ForecastError::at_line(Path::new("f.grp"), 7, "expected 4 data types");
        assert_eq!(err.to_string(), "cannot read f.grp (line 7): expected 4 data types");
    }

    #[test]
    fn zone_not_found_stays_not_found() {
        let zone = hydromet_zones::ZoneError::FileNotFound {
            path: PathBuf::from("p.csv"),
        };
        assert!(matches!(ForecastError::from(zone), ForecastError::FileNotFound { .. }));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<ForecastError>();
    }
}
