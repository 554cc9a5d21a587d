/// Convenience result type used across sketchbook.
pub type SketchResult<T> = Result<T, SketchError>;

/// Top-level error taxonomy used by session and compositing APIs.
///
/// Only [`SketchError::Validation`] and [`SketchError::SessionClosed`] ever reach a session
/// caller. The remaining variants describe recoverable failures of derived artifacts and are
/// logged by the session instead of being returned.
#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    /// Invalid user-provided data or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// A stroke blob could not be read back into a drawing.
    #[error("decode error: {0}")]
    Decode(String),

    /// The drawing surface could not produce a raster image.
    #[error("rasterize error: {0}")]
    Rasterize(String),

    /// Lossy encoding of a composite failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// An export sink rejected a final image.
    #[error("export error: {0}")]
    Export(String),

    /// An intent arrived after the session was closed.
    #[error("session is closed")]
    SessionClosed,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SketchError {
    /// Build a [`SketchError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SketchError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SketchError::Rasterize`] value.
    pub fn rasterize(msg: impl Into<String>) -> Self {
        Self::Rasterize(msg.into())
    }

    /// Build a [`SketchError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SketchError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
