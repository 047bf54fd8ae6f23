//! Session descriptor persistence over a [`CookieJar`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pageboot_protocol::{SESSION_COOKIE, SessionGrant};
use tracing::{debug, info};

use crate::descriptor::{DescriptorError, SessionDescriptor};
use crate::error::Result;
use crate::jar::CookieJar;

/// Reads and writes the single session slot of an origin.
///
/// A stored value that does not decode reads as "no session".
#[derive(Clone)]
pub struct SessionStore {
    jar: Arc<dyn CookieJar>,
}

impl SessionStore {
    pub fn new(jar: Arc<dyn CookieJar>) -> Self {
        Self { jar }
    }

    /// Persists `descriptor` until `expires_at`, replacing any previous session.
    pub fn write(&self, descriptor: &SessionDescriptor, expires_at: DateTime<Utc>) -> Result<()> {
        self.jar
            .set(SESSION_COOKIE, &descriptor.encode(), expires_at)?;
        info!(
            target = "pageboot.session",
            session = descriptor.id(),
            user = descriptor.user_id(),
            %expires_at,
            "session stored"
        );
        Ok(())
    }

    /// Stores the session granted by a login response.
    pub fn write_grant(&self, grant: &SessionGrant) -> Result<SessionDescriptor> {
        let descriptor = SessionDescriptor::new(&grant.id, &grant.user_id, &grant.auth)?;
        let expires_at = grant
            .expires
            .to_datetime()
            .ok_or(DescriptorError::InvalidExpiry)?;
        self.write(&descriptor, expires_at)?;
        Ok(descriptor)
    }

    /// Current descriptor, `None` when absent, expired, or malformed.
    pub fn read(&self) -> Result<Option<SessionDescriptor>> {
        let Some(raw) = self.raw()? else {
            return Ok(None);
        };
        let descriptor = SessionDescriptor::decode(&raw);
        if descriptor.is_none() {
            debug!(target = "pageboot.session", "stored session value is malformed; treating as absent");
        }
        Ok(descriptor)
    }

    /// Stored value exactly as it travels in a `Cookie` header.
    pub fn raw(&self) -> Result<Option<String>> {
        self.jar.get(SESSION_COOKIE)
    }

    /// Removes the session immediately. Clearing an empty slot is a no-op.
    pub fn clear(&self) -> Result<()> {
        self.jar.expire(SESSION_COOKIE)?;
        debug!(target = "pageboot.session", "session cleared");
        Ok(())
    }
}
