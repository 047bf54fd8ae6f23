//! Error types for the session bootstrap layer.

use pageboot_runtime::LoaderError;
use thiserror::Error;

use crate::api::ApiError;
use crate::descriptor::DescriptorError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the bootstrap, the session store and its jars.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a config file or a file-backed cookie jar failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cookie jar or config file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The platform cookie slot cannot be reached (no document, sandboxed frame).
    #[error("cookie jar unavailable: {0}")]
    JarUnavailable(String),

    #[error("invalid session descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Remote call failed; never retried or downgraded.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error("invalid config: {0}")]
    Config(String),
}
