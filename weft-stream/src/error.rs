//! Wire-level error helpers

use weft_core::Error as CoreError;

/// Convert transport failures to core errors
pub fn transport_error(error: reqwest::Error) -> CoreError {
    CoreError::Transport {
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}

/// Convert serialization errors to core errors
pub fn serialization_error(error: serde_json::Error) -> CoreError {
    CoreError::Serialization {
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}
