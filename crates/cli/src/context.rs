use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use pageboot::{BootConfig, CookieJar, FileJar, HttpApi, SessionStore, SiteApi};
use reqwest::Url;
use tracing::debug;

/// Settings shared by every command, resolved from the config file and flags.
#[derive(Debug, Clone)]
pub struct CommandContext {
	pub config: BootConfig,
	pub jar_path: PathBuf,
}

impl CommandContext {
	pub fn resolve(config_path: Option<&Path>, origin: Option<String>, jar: Option<PathBuf>) -> Result<Self> {
		let mut config = match config_path {
			Some(path) => BootConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))?,
			None => BootConfig::default(),
		};
		if let Some(origin) = origin {
			config.origin = origin;
		}
		config.check()?;

		let jar_path = match jar {
			Some(path) => path,
			None => default_jar_path(&config.origin)?,
		};
		debug!(target = "pageboot", origin = %config.origin, jar = %jar_path.display(), "context resolved");
		Ok(Self { config, jar_path })
	}

	pub fn jar(&self) -> Arc<dyn CookieJar> {
		Arc::new(FileJar::new(&self.jar_path))
	}

	pub fn store(&self) -> SessionStore {
		SessionStore::new(self.jar())
	}

	pub fn api(&self) -> Result<Arc<dyn SiteApi>> {
		let api = HttpApi::new(&self.config.origin, &self.config.api_path)?;
		Ok(Arc::new(api))
	}
}

/// File name for an origin's jar: the host, plus the port when one is given.
pub fn jar_file_name(origin: &str) -> Result<String> {
	let url = Url::parse(origin).with_context(|| format!("invalid origin '{origin}'"))?;
	let host = url.host_str().with_context(|| format!("origin '{origin}' has no host"))?;
	Ok(match url.port() {
		Some(port) => format!("{host}_{port}.json"),
		None => format!("{host}.json"),
	})
}

pub fn default_jar_path(origin: &str) -> Result<PathBuf> {
	let base = dirs::config_dir().context("no configuration directory for this platform")?;
	Ok(base.join("pageboot").join("jars").join(jar_file_name(origin)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn jar_names_include_port_when_present() {
		assert_eq!(jar_file_name("https://example.com").unwrap(), "example.com.json");
		assert_eq!(jar_file_name("http://127.0.0.1:5000/").unwrap(), "127.0.0.1_5000.json");
		assert!(jar_file_name("not a url").is_err());
	}

	#[test]
	fn flags_override_config_file() {
		let temp = TempDir::new().unwrap();
		let config = temp.path().join("pageboot.json");
		std::fs::write(&config, r#"{"origin": "https://a.example", "modules": ["globals"], "maxReloads": 3}"#).unwrap();
		let jar = temp.path().join("jar.json");

		let ctx = CommandContext::resolve(Some(&config), Some("https://b.example".into()), Some(jar.clone())).unwrap();
		assert_eq!(ctx.config.origin, "https://b.example");
		assert_eq!(ctx.config.modules, vec!["globals"]);
		assert_eq!(ctx.config.max_reloads, 3);
		assert_eq!(ctx.jar_path, jar);
	}

	#[test]
	fn empty_origin_is_rejected() {
		assert!(CommandContext::resolve(None, Some(String::new()), None).is_err());
	}
}
