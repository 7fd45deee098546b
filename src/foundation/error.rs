use std::path::PathBuf;

/// Convenience result type used across traitgen.
pub type TraitgenResult<T> = Result<T, TraitgenError>;

/// Top-level error taxonomy used by generator and renderer APIs.
#[derive(thiserror::Error, Debug)]
pub enum TraitgenError {
    /// Invalid or infeasible catalog configuration. Always fatal.
    #[error("config error: {0}")]
    Config(String),

    /// Malformed configuration document.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A layer image referenced by a token does not exist.
    #[error("asset missing: '{}'", .0.display())]
    AssetMissing(PathBuf),

    /// Rejection sampling gave up after the configured attempt cap.
    #[error(
        "sampling stalled: {accepted} of {size} unique tokens accepted after {attempts} attempts"
    )]
    SamplingStall {
        /// Unique tokens accepted before giving up.
        accepted: usize,
        /// Requested set size.
        size: usize,
        /// Candidates drawn in total.
        attempts: u64,
    },

    /// Errors while compositing or writing token images.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TraitgenError {
    /// Build a [`TraitgenError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`TraitgenError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`TraitgenError::AssetMissing`] value.
    pub fn asset_missing(path: impl Into<PathBuf>) -> Self {
        Self::AssetMissing(path.into())
    }

    /// Build a [`TraitgenError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
