//! Errors surfaced by rate resolution.

/// Errors that can occur while resolving or fetching a rate.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// A currency code was absent or blank.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The rate could not be obtained. Carries the underlying cause text.
    #[error("Failed conversion: {message}")]
    FailedConversion { message: String },

    /// The remote payload was not valid JSON or did not have the expected shape.
    #[error("Failed to parse rate response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConversionError {
    pub fn failed(message: impl Into<String>) -> Self {
        ConversionError::FailedConversion {
            message: message.into(),
        }
    }

    /// Collapses lower level failures into `FailedConversion`, keeping the cause text.
    pub fn into_failed(self) -> Self {
        match self {
            ConversionError::Parse(e) => {
                ConversionError::failed(format!("invalid rate response: {e}"))
            }
            other => other,
        }
    }
}

/// Result type for rate resolution.
pub type Result<T, E = ConversionError> = std::result::Result<T, E>;
