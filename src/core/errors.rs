//! Error types for the nps-stats library.
//!
//! The statistics core never fails: malformed input degrades to zero counts
//! or an undefined score. Errors only arise at the edges of the crate, where
//! configuration files are loaded, CSV batches are ingested and reports are
//! serialized.

use std::io;

use thiserror::Error;

/// Main result type for nps-stats operations.
pub type Result<T> = std::result::Result<T, NpsError>;

/// Error type for every fallible nps-stats operation.
#[derive(Error, Debug)]
pub enum NpsError {
    /// I/O related errors (file reads and writes)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Errors raised while reading tabular survey input
    #[error("Parse error: {message}")]
    Parse {
        /// Error description
        message: String,
        /// Line number of the offending record (if available)
        line: Option<u64>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for input data and parameters
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
    },
}

impl NpsError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            line: None,
        }
    }

    /// Create a new parse error pointing at an input line
    pub fn parse_at_line(message: impl Into<String>, line: u64) -> Self {
        Self::Parse {
            message: message.into(),
            line: Some(line),
        }
    }

    /// Create a new validation error naming the offending field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<io::Error> for NpsError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for NpsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for NpsError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for NpsError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(csv::Position::line);
        if err.is_io_error() {
            if let csv::ErrorKind::Io(io_err) = err.into_kind() {
                return Self::io("CSV read failed", io_err);
            }
            return Self::parse("CSV read failed");
        }
        Self::Parse {
            message: format!("CSV parse failed: {err}"),
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = NpsError::internal("standard normal unavailable");
        assert!(matches!(err, NpsError::Internal { .. }));

        let err = NpsError::parse("unterminated quote");
        assert!(matches!(err, NpsError::Parse { line: None, .. }));
    }

    #[test]
    fn test_config_field_error() {
        let err = NpsError::config_field("must be positive", "segmentation.z_value");

        if let NpsError::Config { message, field } = err {
            assert_eq!(message, "must be positive");
            assert_eq!(field, Some("segmentation.z_value".to_string()));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: NpsError = json_err.into();

        if let NpsError::Serialization { data_type, .. } = err {
            assert_eq!(data_type, Some("JSON".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<i32>("invalid: yaml: content").unwrap_err();
        let err: NpsError = yaml_err.into();

        if let NpsError::Serialization { data_type, .. } = err {
            assert_eq!(data_type, Some("YAML".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }

    #[test]
    fn test_from_csv_error_keeps_line() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader("a,b\n1,2\n3\n".as_bytes());
        let csv_err = reader
            .records()
            .find_map(|record| record.err())
            .unwrap();
        let err: NpsError = csv_err.into();

        if let NpsError::Parse { line, .. } = err {
            assert_eq!(line, Some(3));
        } else {
            panic!("Expected Parse error");
        }
    }

    #[test]
    fn test_error_display_formatting() {
        let err = NpsError::parse_at_line("non-numeric count", 7);
        let display = format!("{}", err);
        assert!(display.contains("Parse error"));
        assert!(display.contains("non-numeric count"));
    }
}
