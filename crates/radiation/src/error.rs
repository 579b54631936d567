//! Error types for hydromet-radiation.

use std::path::PathBuf;

/// Error type for all fallible operations in the hydromet-radiation crate.
#[derive(Debug, thiserror::Error)]
pub enum RadiationError {
    /// Returned when a parameter file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when the engine setup is invalid (timestep, aspect code,
    /// parameter rows).
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of the problem.
        reason: String,
    },

    /// Wraps an error from the hydromet-zones crate.
    #[error("zone error: {reason}")]
    Zone {
        /// Description of the underlying zone failure.
        reason: String,
    },
}

impl From<hydromet_zones::ZoneError> for RadiationError {
    fn from(e: hydromet_zones::ZoneError) -> Self {
        match e {
            hydromet_zones::ZoneError::FileNotFound { path } => RadiationError::FileNotFound { path },
            other => RadiationError::Zone {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_configuration() {
        let err = RadiationError::Configuration {
            reason: "net radiation needs a daily timestep, got 6h".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "configuration error: net radiation needs a daily timestep, got 6h"
        );
    }

    #[test]
    fn zone_file_not_found_is_preserved() {
        let err: RadiationError = hydromet_zones::ZoneError::FileNotFound {
            path: PathBuf::from("rn.csv"),
        }
        .into();
        assert!(matches!(err, RadiationError::FileNotFound { .. }));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<RadiationError>();
    }
}
