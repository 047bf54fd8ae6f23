//! User record returned by `GET /users/{id}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Public view of a site user.
///
/// Only `username` is guaranteed; other fields the server adds are kept
/// in `extra` so consumers can still read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    /// Display name when set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    /// Label of the form `@user` or `Display Name (@user)`.
    pub fn name_text(&self) -> String {
        let handle = format!("@{}", self.username);
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() && name != self.username => format!("{name} ({handle})"),
            _ => handle,
        }
    }
}
