/// Convenience result type used across yuvcomp.
pub type YuvcompResult<T> = Result<T, YuvcompError>;

/// Top-level error taxonomy used by compositor APIs.
#[derive(thiserror::Error, Debug)]
pub enum YuvcompError {
    /// Malformed caller-provided data (layer lists, timings, display lists, file names).
    #[error("validation error: {0}")]
    Validation(String),

    /// A caller contract was broken (non-monotonic frames, bad dimensions, size mismatch).
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// A file or directory could not be found or fully read.
    #[error("resource error: {0}")]
    Resource(String),

    /// The graphics backend failed to rasterize.
    #[error("graphics error: {0}")]
    Graphics(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl YuvcompError {
    /// Build a [`YuvcompError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`YuvcompError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`YuvcompError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`YuvcompError::Graphics`] value.
    pub fn graphics(msg: impl Into<String>) -> Self {
        Self::Graphics(msg.into())
    }

    /// Build a [`YuvcompError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
