//! Error types for hydromet-station.

use std::path::{Path, PathBuf};

/// Error type for all fallible operations in the hydromet-station crate.
///
/// Covers missing or malformed station files, unknown station formats,
/// inconsistent read requests, and failures bubbling up from the NetCDF,
/// HDF5 and calendar layers.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a station file cannot be read or is malformed.
    #[error("cannot read {}{}: {reason}", path.display(), line_suffix(*line))]
    FileRead {
        /// File being read.
        path: PathBuf,
        /// 1-based line number, when the failure is tied to one line.
        line: Option<usize>,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when a station source or format code matches no backend.
    #[error("invalid station type: {identifier}")]
    InvalidType {
        /// The identifier or code that could not be dispatched.
        identifier: String,
    },

    /// Returned when a read request is inconsistent with the data source.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of the inconsistency.
        reason: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name (first alias) of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Wraps an error originating from the HDF5 library.
    #[error("hdf5 error: {reason}")]
    Hdf5 {
        /// Description of the underlying HDF5 failure.
        reason: String,
    },

    /// Wraps an error originating from the hydromet-calendar crate.
    #[error("calendar error: {reason}")]
    Calendar {
        /// Description of the underlying calendar failure.
        reason: String,
    },
}

impl StationError {
    /// Builds a [`StationError::FileRead`] tied to one line of `path`.
    pub fn at_line(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        StationError::FileRead {
            path: path.to_path_buf(),
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// Builds a [`StationError::FileRead`] for `path` without a line.
    pub fn read(path: &Path, reason: impl Into<String>) -> Self {
        StationError::FileRead {
            path: path.to_path_buf(),
            line: None,
            reason: reason.into(),
        }
    }

    /// Tags a NetCDF or HDF5 library failure with the file it came from,
    /// turning it into [`StationError::FileRead`]. Other errors already
    /// name their file, or have none, and are returned unchanged.
    pub fn within(self, path: &Path) -> Self {
        match self {
            StationError::Netcdf { .. } | StationError::Hdf5 { .. } => Self::read(path, self.to_string()),
            other => other,
        }
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StationError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::read(path, err.to_string())
        }
    }
}

fn line_suffix(line: Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}

impl From<netcdf::Error> for StationError {
    fn from(e: netcdf::Error) -> Self {
        StationError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<hdf5::Error> for StationError {
    fn from(e: hdf5::Error) -> Self {
        StationError::Hdf5 {
            reason: e.to_string(),
        }
    }
}

impl From<hydromet_calendar::CalendarError> for StationError {
    fn from(e: hydromet_calendar::CalendarError) -> Self {
        StationError::Calendar {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_read_with_line() {
        let err = StationError::at_line(Path::new("/data/a.met"), 12, "bad precipitation");
        assert_eq!(err.to_string(), "cannot read /data/a.met (line 12): bad precipitation");
    }

    #[test]
    fn display_file_read_without_line() {
        let err = StationError::read(Path::new("/data/s.h5"), "no station group");
        assert_eq!(err.to_string(), "cannot read /data/s.h5: no station group");
    }

    #[test]
    fn display_invalid_type() {
        let err = StationError::InvalidType {
            identifier: "stations.xls".to_string(),
        };
        assert_eq!(err.to_string(), "invalid station type: stations.xls");
    }

    #[test]
    fn io_not_found_maps_to_file_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = StationError::io(Path::new("x.stm"), io);
        assert!(matches!(err, StationError::FileNotFound { .. }));
    }

    #[test]
    fn from_netcdf_error() {
        let err: StationError = netcdf::Error::Str("test nc error".to_string()).into();
        assert!(matches!(err, StationError::Netcdf { .. }));
        assert!(err.to_string().contains("test nc error"));
    }

    #[test]
    fn within_tags_backend_errors_with_the_path() {
        let err: StationError = netcdf::Error::Str("bad header".to_string()).into();
        match err.within(Path::new("/data/obs.nc")) {
            StationError::FileRead { path, line, reason } => {
                assert_eq!(path, Path::new("/data/obs.nc"));
                assert_eq!(line, None);
                assert!(reason.contains("bad header"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let not_found = StationError::FileNotFound {
            path: PathBuf::from("a.nc"),
        };
        assert!(matches!(not_found.within(Path::new("b.nc")), StationError::FileNotFound { .. }));
    }

    #[test]
    fn from_calendar_error() {
        let cal = hydromet_calendar::CalendarError::InvalidHour { hour: 30 };
        let err: StationError = cal.into();
        assert!(matches!(err, StationError::Calendar { .. }));
        assert!(err.to_string().contains("calendar error"));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<StationError>();
    }
}
