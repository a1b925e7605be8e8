//! Error types and handling for the Lake Shore 335 adapter
//!
//! This module defines the error types used throughout the crate,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, LakeshoreError>;

/// Main error type for the adapter
#[derive(Debug, Error)]
pub enum LakeshoreError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serial transport errors (open, write, not connected)
    #[error("Serial error: {message}")]
    Serial { message: String },

    /// Instrument reply could not be coerced into the expected type
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl LakeshoreError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        LakeshoreError::Config {
            message: message.into(),
        }
    }

    /// Create a new serial transport error
    pub fn serial<S: Into<String>>(message: S) -> Self {
        LakeshoreError::Serial {
            message: message.into(),
        }
    }

    /// Create a new protocol (reply coercion) error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        LakeshoreError::Protocol {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        LakeshoreError::Web {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        LakeshoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        LakeshoreError::Io {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        LakeshoreError::Generic {
            message: message.into(),
        }
    }

    /// Error returned by every exchange attempted while the port is closed
    pub fn not_connected() -> Self {
        LakeshoreError::serial("Not connected to instrument")
    }

    /// Whether this error reports a missing connection
    pub fn is_not_connected(&self) -> bool {
        matches!(self, LakeshoreError::Serial { message } if message.starts_with("Not connected"))
    }
}

impl From<std::io::Error> for LakeshoreError {
    fn from(err: std::io::Error) -> Self {
        LakeshoreError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for LakeshoreError {
    fn from(err: serde_yaml::Error) -> Self {
        LakeshoreError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for LakeshoreError {
    fn from(err: serde_json::Error) -> Self {
        LakeshoreError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<tokio_serial::Error> for LakeshoreError {
    fn from(err: tokio_serial::Error) -> Self {
        LakeshoreError::serial(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LakeshoreError::config("test config error");
        assert!(matches!(err, LakeshoreError::Config { .. }));

        let err = LakeshoreError::serial("test serial error");
        assert!(matches!(err, LakeshoreError::Serial { .. }));

        let err = LakeshoreError::validation("field", "test validation error");
        assert!(matches!(err, LakeshoreError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LakeshoreError::config("test error");
        assert_eq!(format!("{}", err), "Configuration error: test error");

        let err = LakeshoreError::validation("output", "must be 1 or 2");
        assert_eq!(format!("{}", err), "Validation error: output - must be 1 or 2");
    }

    #[test]
    fn test_not_connected_classification() {
        assert!(LakeshoreError::not_connected().is_not_connected());
        assert!(!LakeshoreError::serial("write failed").is_not_connected());
        assert!(!LakeshoreError::protocol("Not connected").is_not_connected());
    }
}
