//! Wire types for the site API consumed by the bootstrap layer.
//!
//! This crate contains the serde-serializable types exchanged with the
//! site's `/api` endpoints and the cookie string format used for the
//! persisted session slot. These types represent the "protocol layer":
//! the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond (de)serialization and string codecs
//! * 1:1 with the wire: Match what the site server emits and accepts
//! * Stable: Changes only when the server contract changes
//!
//! Session persistence, validation and user lookup are built on top of
//! these types in `pageboot-rs`.

pub mod cookie;
pub mod grant;
pub mod truthy;
pub mod user;

pub use cookie::*;
pub use grant::*;
pub use truthy::*;
pub use user::*;
