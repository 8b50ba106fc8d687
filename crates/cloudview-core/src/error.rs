//! Error types for cloudview core operations

use thiserror::Error;

/// Errors that can occur while building, executing or inspecting a pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Pipeline description is not valid JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pipeline description has the wrong shape
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// No stage registered under this type name
    #[error("unknown stage type: {0}")]
    UnknownStage(String),

    /// A stage option is missing or has an unusable value
    #[error("invalid option for {stage}: {message}")]
    InvalidOption { stage: String, message: String },

    /// Operation requires an executed pipeline
    #[error("pipeline has not been executed")]
    NotExecuted,

    /// Spatial reference could not be parsed or transformed
    #[error("spatial reference error: {0}")]
    SpatialReference(String),

    /// Dimension name or type is not known
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// Value cannot be stored in its dimension's type
    #[error("value out of range: {0}")]
    ValueOutOfRange(String),

    /// Views with different layouts cannot be combined
    #[error("layout mismatch: {0}")]
    LayoutMismatch(String),
}

impl Error {
    pub(crate) fn option(stage: &str, message: impl Into<String>) -> Self {
        Error::InvalidOption {
            stage: stage.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias using the cloudview core error.
pub type Result<T> = std::result::Result<T, Error>;
