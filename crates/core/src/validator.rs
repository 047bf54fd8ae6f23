//! Session validation on bootstrap.

use std::fmt;
use std::sync::Arc;

use pageboot_protocol::is_truthy;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::SiteApi;
use crate::descriptor::SessionDescriptor;
use crate::error::Result;
use crate::store::SessionStore;
use crate::view::View;

/// Server verdict on a stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationOutcome {
    /// Keep the descriptor.
    Valid,
    /// Purge the descriptor and reload the view.
    Invalid,
}

/// Where the validator settled for the current boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session was stored, so nothing was checked.
    #[default]
    Unchecked,
    Valid,
    Invalid,
}

impl From<ValidationOutcome> for SessionState {
    fn from(outcome: ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid => Self::Valid,
            ValidationOutcome::Invalid => Self::Invalid,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unchecked => "unchecked",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        })
    }
}

/// Checks the stored session once per boot and self-heals a stale one.
#[derive(Clone)]
pub struct SessionValidator {
    store: SessionStore,
    api: Arc<dyn SiteApi>,
    view: Arc<dyn View>,
}

impl SessionValidator {
    pub fn new(store: SessionStore, api: Arc<dyn SiteApi>, view: Arc<dyn View>) -> Self {
        Self { store, api, view }
    }

    /// One remote check of `session`; truthy replies are valid.
    pub async fn check(&self, session: &SessionDescriptor) -> Result<ValidationOutcome> {
        let reply = self.api.validate_session(session).await?;
        Ok(if is_truthy(&reply) {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid
        })
    }

    /// Validates the stored session.
    ///
    /// With no session stored no call is made. An invalid session is cleared
    /// and the view reloaded exactly once. Transport failures propagate.
    pub async fn validate(&self) -> Result<SessionState> {
        let Some(session) = self.store.read()? else {
            debug!(target = "pageboot.session", "no stored session; skipping validation");
            return Ok(SessionState::Unchecked);
        };

        match self.check(&session).await? {
            ValidationOutcome::Valid => {
                info!(target = "pageboot.session", user = session.user_id(), "session valid");
                Ok(SessionState::Valid)
            }
            ValidationOutcome::Invalid => {
                warn!(target = "pageboot.session", user = session.user_id(), "session rejected; clearing and reloading");
                self.store.clear()?;
                self.view.reload();
                Ok(SessionState::Invalid)
            }
        }
    }
}
