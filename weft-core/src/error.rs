//! Error types for the Weft library

use std::error::Error as StdError;
use std::fmt;

/// The main error type for all Weft operations
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level failures (connection drops, non-success HTTP status).
    /// These are the only errors that abort an in-flight stream.
    Transport {
        /// Error message
        message: String,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    Serialization {
        /// Error message
        message: String,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Configuration errors
    Configuration(String),

    /// Response-level errors (a stream that never produced a usable turn)
    Response {
        /// Error message
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport { message, .. } => write!(f, "Transport error: {}", message),
            Error::Serialization { message, .. } => write!(f, "Serialization error: {}", message),
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Response { message } => write!(f, "Response error: {}", message),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Transport { source, .. } | Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

/// Result type alias for Weft operations
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations for error conversions
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let error = Error::Transport {
            message: "Connection refused".into(),
            source: None,
        };
        assert_eq!(error.to_string(), "Transport error: Connection refused");

        let error = Error::Serialization {
            message: "Invalid JSON".into(),
            source: None,
        };
        assert_eq!(error.to_string(), "Serialization error: Invalid JSON");

        let error = Error::Configuration("Missing base URL".into());
        assert_eq!(error.to_string(), "Configuration error: Missing base URL");

        let error = Error::Response {
            message: "Stream produced no turn".into(),
        };
        assert_eq!(error.to_string(), "Response error: Stream produced no turn");
    }

    #[test]
    fn test_error_source() {
        let error = Error::Transport {
            message: "Connection failed".into(),
            source: None,
        };
        assert!(error.source().is_none());

        let io_error = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let error = Error::Transport {
            message: "Connection failed".into(),
            source: Some(Box::new(io_error)),
        };
        assert!(error.source().is_some());

        let json_error = serde_json::from_str::<String>("invalid").unwrap_err();
        let error = Error::Serialization {
            message: "JSON parse error".into(),
            source: Some(Box::new(json_error)),
        };
        assert!(error.source().is_some());

        let error = Error::Configuration("test".into());
        assert!(error.source().is_none());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused");
        let error: Error = io_error.into();

        match error {
            Error::Transport { message, source } => {
                assert!(message.contains("Connection refused"));
                assert!(source.is_some());
            }
            _ => panic!("Expected Transport error"),
        }
    }

    #[test]
    fn test_error_from_serde_json_error() {
        let json_error = serde_json::from_str::<String>("invalid json").unwrap_err();
        let error: Error = json_error.into();

        match error {
            Error::Serialization { message, source } => {
                assert!(!message.is_empty());
                assert!(source.is_some());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
