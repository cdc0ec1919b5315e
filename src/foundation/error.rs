/// Convenience result type used across Twinframe.
pub type TwinframeResult<T> = Result<T, TwinframeError>;

/// Top-level error taxonomy used by constructor and parse APIs.
#[derive(thiserror::Error, Debug)]
pub enum TwinframeError {
    /// Invalid user-provided data (sizes, surfaces, effect names).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors in raw pixel-buffer operations (blits, resizes, commits).
    #[error("raster error: {0}")]
    Raster(String),

    /// Errors while parsing or rasterizing a filter descriptor.
    #[error("filter error: {0}")]
    Filter(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TwinframeError {
    /// Build a [`TwinframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TwinframeError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`TwinframeError::Filter`] value.
    pub fn filter(msg: impl Into<String>) -> Self {
        Self::Filter(msg.into())
    }
}
