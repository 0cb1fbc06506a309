//! Error types for imident.
//!
//! Report parsing and diagnostic classification are total and never return
//! errors. The types here cover configuration loading and running the
//! ImageMagick binaries.

use thiserror::Error;

use crate::diagnostic::ClassifiedError;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors from spawning and talking to an ImageMagick process.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The binary could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the process output failed
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish in time and was killed
    #[error("{program} timed out after {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    /// ImageMagick reported a failure
    #[error("{} ({}): {}", .0.kind, .0.status, .0.message)]
    Magick(ClassifiedError),
}

impl DriverError {
    /// The classified tool failure, if this error came from ImageMagick itself.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            DriverError::Magick(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience type alias for driver results.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{classify_error, ErrorKind};

    #[test]
    fn test_magick_error_display() {
        let err = DriverError::Magick(classify_error(
            "identify: Corrupt image `/tmp/a' @ error/x.c/Y/1.",
        ));
        assert_eq!(err.to_string(), "corrupt (422): Corrupt image");
        assert_eq!(err.classified().unwrap().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn test_timeout_display() {
        let err = DriverError::Timeout {
            program: "convert".to_string(),
            timeout_ms: 500,
        };
        assert_eq!(err.to_string(), "convert timed out after 500ms");
        assert!(err.classified().is_none());
    }
}
