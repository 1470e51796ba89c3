//! Error types for textlayer.
//!
//! Every fallible operation in the crate returns [`TextLayerError`]. The
//! taxonomy is deliberately small and maps one-to-one onto the outcomes a
//! caller can act on:
//!
//! - `InvalidInput` - malformed request, detected before any recognition
//!   starts; recoverable by re-submitting a corrected request
//! - `Cancelled` - cooperative cancellation was observed; not a failure,
//!   no partial result is returned
//! - `RecognitionFailed` - the engine could not complete the batch; a single
//!   failure for the whole call, never partial per-page results
//! - `FormattingUnavailable` - the requested output kind has no usable
//!   formatter on this build/platform
//! - `SerializationFailed` - the formatter could not materialize its bytes
//!
//! Underlying causes (I/O errors, subprocess failures, encoder errors) are
//! preserved through `#[source]` so error chains stay inspectable.
use thiserror::Error;

/// Result type alias using [`TextLayerError`].
pub type Result<T> = std::result::Result<T, TextLayerError>;

/// Main error type for all textlayer operations.
#[derive(Debug, Error)]
pub enum TextLayerError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Job cancelled")]
    Cancelled,

    #[error("Recognition failed: {message}")]
    RecognitionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Formatting unavailable: {message}")]
    FormattingUnavailable { message: String },

    #[error("Serialization failed: {message}")]
    SerializationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TextLayerError {
    /// Create an `InvalidInput` error.
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a `RecognitionFailed` error.
    pub fn recognition<S: Into<String>>(message: S) -> Self {
        Self::RecognitionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `RecognitionFailed` error with source.
    pub fn recognition_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RecognitionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a `FormattingUnavailable` error.
    pub fn formatting_unavailable<S: Into<String>>(message: S) -> Self {
        Self::FormattingUnavailable {
            message: message.into(),
        }
    }

    /// Create a `SerializationFailed` error.
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::SerializationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `SerializationFailed` error with source.
    pub fn serialization_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SerializationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error is the cooperative-cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
