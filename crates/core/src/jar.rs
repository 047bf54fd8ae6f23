//! Per-origin cookie storage backing the session slot.
//!
//! A jar maps cookie names to values with an absolute expiry. Expired
//! entries read as absent, and writing an entry whose expiry has passed
//! deletes it, which is how the session slot is cleared.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Persistent key-value cookie slot for one origin.
pub trait CookieJar: Send + Sync {
    /// Returns the live value for `name`.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Stores `value` until `expires`; an expiry in the past deletes the entry.
    fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> Result<()>;

    /// Deletes `name` by expiring it at the epoch.
    fn expire(&self, name: &str) -> Result<()> {
        self.set(name, "", DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// A stored cookie value and its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    pub expires: DateTime<Utc>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }
}

fn apply(
    cookies: &mut BTreeMap<String, StoredCookie>,
    name: &str,
    value: &str,
    expires: DateTime<Utc>,
) {
    if expires <= Utc::now() {
        cookies.remove(name);
    } else {
        cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires,
            },
        );
    }
}

/// In-process jar; lives as long as the value.
#[derive(Debug, Default)]
pub struct MemoryJar {
    cookies: Mutex<BTreeMap<String, StoredCookie>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the live cookies.
    pub fn names(&self) -> Vec<String> {
        let now = Utc::now();
        self.cookies
            .lock()
            .iter()
            .filter(|(_, cookie)| cookie.is_live(now))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl CookieJar for MemoryJar {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let now = Utc::now();
        let mut cookies = self.cookies.lock();
        match cookies.get(name) {
            Some(cookie) if cookie.is_live(now) => Ok(Some(cookie.value.clone())),
            Some(_) => {
                cookies.remove(name);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> Result<()> {
        apply(&mut self.cookies.lock(), name, value, expires);
        Ok(())
    }
}

/// On-disk format for a [`FileJar`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct JarFile {
    #[serde(default)]
    cookies: BTreeMap<String, StoredCookie>,
}

/// Jar persisted as a JSON file so the slot survives across process runs.
///
/// The file is re-read on every access; concurrent writers resolve as last
/// write wins. An unreadable or corrupt file reads as an empty jar.
#[derive(Debug, Clone)]
pub struct FileJar {
    path: PathBuf,
}

impl FileJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<JarFile> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(JarFile::default()),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&content) {
            Ok(file) => Ok(file),
            Err(err) => {
                warn!(
                    target = "pageboot.session",
                    path = %self.path.display(),
                    error = %err,
                    "ignoring corrupt cookie jar"
                );
                Ok(JarFile::default())
            }
        }
    }

    fn save(&self, file: &JarFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(file)?)?;
        Ok(())
    }
}

impl CookieJar for FileJar {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let now = Utc::now();
        Ok(self
            .load()?
            .cookies
            .get(name)
            .filter(|cookie| cookie.is_live(now))
            .map(|cookie| cookie.value.clone()))
    }

    fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> Result<()> {
        let mut file = self.load()?;
        apply(&mut file.cookies, name, value, expires);
        self.save(&file)?;
        debug!(target = "pageboot.session", path = %self.path.display(), cookie = name, "cookie jar written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use tempfile::TempDir;

    fn tomorrow() -> DateTime<Utc> {
        Utc::now() + TimeDelta::days(1)
    }

    #[test]
    fn memory_jar_set_get_expire() {
        let jar = MemoryJar::new();
        assert_eq!(jar.get("session").unwrap(), None);

        jar.set("session", "1.2.3", tomorrow()).unwrap();
        assert_eq!(jar.get("session").unwrap().as_deref(), Some("1.2.3"));
        assert_eq!(jar.names(), vec!["session".to_string()]);

        jar.expire("session").unwrap();
        assert_eq!(jar.get("session").unwrap(), None);
        assert!(jar.names().is_empty());
    }

    #[test]
    fn past_expiry_reads_as_absent() {
        let jar = MemoryJar::new();
        jar.set("session", "1.2.3", Utc::now() - TimeDelta::seconds(5)).unwrap();
        assert_eq!(jar.get("session").unwrap(), None);
    }

    #[test]
    fn file_jar_persists_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jars").join("example.com.json");

        FileJar::new(&path).set("session", "a.b.c", tomorrow()).unwrap();
        assert_eq!(FileJar::new(&path).get("session").unwrap().as_deref(), Some("a.b.c"));

        FileJar::new(&path).expire("session").unwrap();
        assert_eq!(FileJar::new(&path).get("session").unwrap(), None);
    }

    #[test]
    fn file_jar_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let jar = FileJar::new(temp.path().join("absent.json"));
        assert_eq!(jar.get("session").unwrap(), None);
        jar.expire("session").unwrap();
    }

    #[test]
    fn file_jar_corrupt_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jar.json");
        fs::write(&path, "{ not json").unwrap();

        let jar = FileJar::new(&path);
        assert_eq!(jar.get("session").unwrap(), None);
        jar.set("session", "1.2.3", tomorrow()).unwrap();
        assert_eq!(jar.get("session").unwrap().as_deref(), Some("1.2.3"));
    }
}
