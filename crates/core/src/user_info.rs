//! Lookup of the logged-in visitor's user record.

use std::sync::Arc;

use pageboot_protocol::UserInfo;
use tracing::debug;

use crate::api::SiteApi;
use crate::error::Result;
use crate::store::SessionStore;

/// Fetches the user behind the stored session. No retry, no caching.
#[derive(Clone)]
pub struct UserInfoFetcher {
    store: SessionStore,
    api: Arc<dyn SiteApi>,
}

impl UserInfoFetcher {
    pub fn new(store: SessionStore, api: Arc<dyn SiteApi>) -> Self {
        Self { store, api }
    }

    /// User record, or `None` without a remote call when logged out.
    pub async fn fetch_info(&self) -> Result<Option<UserInfo>> {
        let Some(session) = self.store.read()? else {
            debug!(target = "pageboot.session", "no stored session; skipping user lookup");
            return Ok(None);
        };
        let user = self.api.user(&session).await?;
        Ok(Some(user))
    }

    /// Invokes `callback` once with the user record; never when logged out.
    pub async fn fetch<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(UserInfo),
    {
        if let Some(user) = self.fetch_info().await? {
            callback(user);
        }
        Ok(())
    }
}
