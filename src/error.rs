//! Error types for the fallible edges of the widget.
//!
//! The controller itself never fails; unknown ids and malformed shapes are
//! ignored. Errors only arise while reading configuration, inspecting
//! images for the native demo, and talking to JavaScript.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised outside the interaction controller.
#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image could not be opened or decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration value that cannot drive a widget
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// Image file not found at expected path
    #[error("Image not found: {path:?}")]
    ImageNotFound {
        /// Path where the image was expected
        path: PathBuf,
    },

    /// A JavaScript call failed
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl AnnotatorError {
    /// Create an invalid configuration error with a message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an image not found error.
    pub fn image_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ImageNotFound { path: path.into() }
    }

    /// Create a JavaScript error from a description.
    pub fn js(message: impl Into<String>) -> Self {
        Self::Js(message.into())
    }
}

/// Result type for fallible widget operations.
pub type Result<T> = std::result::Result<T, AnnotatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AnnotatorError::invalid_config("imageUrl is required");
        assert_eq!(err.to_string(), "Invalid configuration: imageUrl is required");

        let err = AnnotatorError::image_not_found("frames/missing.png");
        assert!(err.to_string().contains("missing.png"));

        let parse: Result<serde_json::Value> = serde_json::from_str("[").map_err(AnnotatorError::from);
        assert!(matches!(parse, Err(AnnotatorError::Json(_))));
    }
}
