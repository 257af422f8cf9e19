/// Convenience result type used across photostamp.
pub type StampResult<T> = Result<T, StampError>;

/// Top-level error taxonomy used by compositor APIs.
///
/// Only [`StampError::Decode`] is expected from a well-configured
/// [`Compositor`](crate::Compositor); asset and descriptor problems degrade the output
/// instead of failing the call.
#[derive(thiserror::Error, Debug)]
pub enum StampError {
    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image (the source photo or an asset) could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors while rasterizing, compositing or encoding.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StampError {
    /// Build a [`StampError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StampError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StampError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StampError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
