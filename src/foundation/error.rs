/// Convenience result type used across framecap.
pub type FramecapResult<T> = Result<T, FramecapError>;

/// Top-level error taxonomy used by the capture pipeline.
#[derive(thiserror::Error, Debug)]
pub enum FramecapError {
    /// A production path was invoked with layers that contradict its contract.
    #[error("precondition violation: {0}")]
    Precondition(String),

    /// Invalid caller-provided job data or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// The composited surface could not be compressed.
    #[error("encode error: {0}")]
    Encode(String),

    /// The metadata block could not be built, parsed, or spliced.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// A rasterization surface or text engine could not be created.
    #[error("render context error: {0}")]
    RenderContext(String),

    /// Errors when serializing or deserializing the metadata record.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramecapError {
    /// Build a [`FramecapError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`FramecapError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramecapError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FramecapError::Metadata`] value.
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Build a [`FramecapError::RenderContext`] value.
    pub fn render_context(msg: impl Into<String>) -> Self {
        Self::RenderContext(msg.into())
    }

    /// Build a [`FramecapError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for caller-side programming errors.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

impl From<serde_json::Error> for FramecapError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
