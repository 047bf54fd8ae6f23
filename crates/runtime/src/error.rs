//! Loader error types.

use thiserror::Error;

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors raised by [`ModuleLoader`](crate::ModuleLoader).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoaderError {
	/// The queue can only be filled once per loader.
	#[error("unit queue was already enqueued")]
	AlreadyEnqueued,

	/// `start` was called before any units were enqueued.
	#[error("unit queue has not been enqueued")]
	NotEnqueued,

	/// `start` was called on a loader that is already running or finished.
	#[error("loader already started")]
	AlreadyStarted,

	/// The token does not belong to the unit currently loading.
	#[error("stale unit token #{token}")]
	StaleToken { token: u64 },

	/// No resolver entry exists for the named unit; the loader stalls on it.
	#[error("no unit registered for '{name}'")]
	UnresolvedUnit { name: String },

	/// The loader was dropped before its queue drained.
	#[error("loader dropped before the unit queue drained")]
	Abandoned,
}
