//! Error types for the bouquet/metadata model

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or parsing model values
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The designated default service is not part of the bouquet
    #[error("default service '{0}' is not part of the bouquet")]
    DefaultNotInBouquet(String),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A companion entry is missing required data
    #[error("invalid companion: {0}")]
    InvalidCompanion(String),

    /// A URL field could not be parsed
    #[error("invalid URL '{0}': {1}")]
    InvalidUrl(String, String),
}

impl Error {
    /// Create an invalid-companion error from a message
    pub fn invalid_companion(msg: impl Into<String>) -> Self {
        Self::InvalidCompanion(msg.into())
    }

    /// Create an invalid-URL error for a raw value
    pub fn invalid_url(raw: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::InvalidUrl(raw.into(), cause.to_string())
    }
}
