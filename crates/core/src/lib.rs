//! Session bootstrap for browser-rendered content sites.
//!
//! Before any page behavior runs, a [`Bootstrap`] loads the site's units in
//! a fixed order through a [`ModuleLoader`](pageboot_runtime::ModuleLoader)
//! and, once they have all loaded, checks whether the visitor's stored
//! session is still accepted by the server. A rejected session is cleared
//! and the view reloaded, so the next boot starts logged out.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pageboot::{BootConfig, Bootstrap, HttpApi, MemoryJar, ReloadSignal};
//! use pageboot_runtime::UnitRegistry;
//!
//! let config = BootConfig::default();
//! let units = config.modules.iter().fold(UnitRegistry::new(), |r, name| r.with_ready_unit(name.as_str()));
//! let api = HttpApi::new(&config.origin, &config.api_path)?;
//! let boot = Bootstrap::new(config, units, Arc::new(MemoryJar::new()), Arc::new(api), Arc::new(ReloadSignal::new()));
//! let report = boot.boot().await?;
//! ```

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod jar;
pub mod store;
pub mod user_info;
pub mod validator;
pub mod view;

pub use api::{ApiError, HttpApi, SiteApi};
pub use bootstrap::{BootReport, Bootstrap};
pub use config::BootConfig;
pub use descriptor::{DescriptorError, SessionDescriptor};
pub use error::{Error, Result};
pub use jar::{CookieJar, FileJar, MemoryJar};
pub use pageboot_protocol::{SessionGrant, UserInfo};
pub use store::SessionStore;
pub use user_info::UserInfoFetcher;
pub use validator::{SessionState, SessionValidator, ValidationOutcome};
pub use view::{ReloadSignal, View};
