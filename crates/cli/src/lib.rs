//! Native driver for pageboot: boots a live site's units from the command
//! line and keeps its session in a file-backed cookie jar.

pub mod cli;
pub mod commands;
pub mod context;
pub mod fetch;
pub mod logging;
pub mod output;
