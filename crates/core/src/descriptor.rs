//! Session descriptor and its `id.user_id.token` encoding.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

const SEPARATOR: char = '.';

/// Reasons a descriptor cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("field `{0}` contains '.'")]
    DottedField(&'static str),

    #[error("session grant has an unrepresentable expiry")]
    InvalidExpiry,
}

/// The triple identifying a logged-in visitor to the server.
///
/// Fields are opaque, non-empty, and never contain `.`, which makes
/// [`decode`](Self::decode) the exact inverse of [`encode`](Self::encode).
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionDescriptor {
    id: String,
    user_id: String,
    token: String,
}

impl SessionDescriptor {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let descriptor = Self {
            id: id.into(),
            user_id: user_id.into(),
            token: token.into(),
        };
        check_field("id", &descriptor.id)?;
        check_field("user_id", &descriptor.user_id)?;
        check_field("token", &descriptor.token)?;
        Ok(descriptor)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Encodes as `id.user_id.token`.
    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.id, self.user_id, self.token
        )
    }

    /// Decodes a stored value; anything but three non-empty parts is `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        let mut parts = raw.split(SEPARATOR);
        let (id, user_id, token) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        Self::new(id, user_id, token).ok()
    }
}

fn check_field(name: &'static str, value: &str) -> Result<(), DescriptorError> {
    if value.is_empty() {
        return Err(DescriptorError::EmptyField(name));
    }
    if value.contains(SEPARATOR) {
        return Err(DescriptorError::DottedField(name));
    }
    Ok(())
}

impl fmt::Debug for SessionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDescriptor")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
