//! Unit loading lifecycle for the page bootstrap.
//!
//! A [`ModuleLoader`] drains a fixed, ordered queue of named units one at a
//! time and fires every callback registered through
//! [`ModuleLoader::register_on_drained`] once the queue is empty.

pub mod error;
pub mod loader;
pub mod unit;

pub use error::{LoaderError, Result};
pub use loader::{DrainedCallback, LoaderStatus, ModuleLoader, StallReport};
pub use unit::{DEFAULT_UNITS, UNIT_ROOT, Unit, UnitContext, UnitRegistry, UnitResolver, UnitToken, unit_path};
