//! Bootstrap configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use pageboot_runtime::DEFAULT_UNITS;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5000";
pub const DEFAULT_API_PATH: &str = "/api";

/// Settings for one site; every field has a default.
///
/// ```json
/// { "origin": "https://example.com", "modules": ["globals", "api"], "stallTimeoutMs": 5000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BootConfig {
    /// Site origin, e.g. `https://example.com`.
    pub origin: String,
    /// API prefix appended to the origin.
    pub api_path: String,
    /// Units in boot order.
    pub modules: Vec<String>,
    /// How long a unit may go without advancing before the driver gives up.
    /// `None` waits forever.
    pub stall_timeout_ms: Option<u64>,
    /// Reloads a driver follows before reporting instead of rebooting.
    pub max_reloads: u32,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            modules: DEFAULT_UNITS.iter().map(|name| name.to_string()).collect(),
            stall_timeout_ms: None,
            max_reloads: 1,
        }
    }
}

impl BootConfig {
    /// Reads a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Rejects settings no site can boot with.
    pub fn check(&self) -> Result<()> {
        if self.origin.trim().is_empty() {
            return Err(Error::Config("origin must not be empty".into()));
        }
        if !self.api_path.is_empty() && !self.api_path.starts_with('/') {
            return Err(Error::Config(format!("apiPath '{}' must start with '/'", self.api_path)));
        }
        if let Some(name) = self.modules.iter().find(|name| name.is_empty() || name.contains('/')) {
            return Err(Error::Config(format!("invalid module name '{name}'")));
        }
        Ok(())
    }

    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_use_site_boot_order() {
        let config = BootConfig::default();
        assert_eq!(config.modules.len(), DEFAULT_UNITS.len());
        assert_eq!(config.modules[0], "globals");
        assert_eq!(config.api_path, "/api");
        assert_eq!(config.stall_timeout(), None);
        config.check().unwrap();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pageboot.json");
        fs::write(&path, r#"{"origin": "https://example.com", "stallTimeoutMs": 250}"#).unwrap();

        let config = BootConfig::load(&path).unwrap();
        assert_eq!(config.origin, "https://example.com");
        assert_eq!(config.stall_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.max_reloads, 1);
        assert_eq!(config.modules, BootConfig::default().modules);
    }

    #[test]
    fn rejects_path_like_module_names() {
        let config = BootConfig {
            modules: vec!["api".into(), "../secrets".into()],
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_relative_api_path() {
        let config = BootConfig {
            api_path: "api".into(),
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(Error::Config(_))));
    }
}
