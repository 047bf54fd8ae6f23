//! Per-page-load bootstrap object.
//!
//! A [`Bootstrap`] is constructed once per page load and owns everything
//! the boot sequence mutates: the unit loader (queue + drained registry)
//! and the session slot. Consumers reach it through the hooks
//! [`on_drained`](Bootstrap::on_drained), [`is_logged_in`](Bootstrap::is_logged_in)
//! and [`get_user_info`](Bootstrap::get_user_info). A reload means a new
//! `Bootstrap`; nothing carries over except the jar.

use std::future::Future;
use std::sync::Arc;

use pageboot_protocol::UserInfo;
use pageboot_runtime::{ModuleLoader, UnitResolver};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::SiteApi;
use crate::config::BootConfig;
use crate::error::{Error, Result};
use crate::jar::CookieJar;
use crate::store::SessionStore;
use crate::user_info::UserInfoFetcher;
use crate::validator::{SessionState, SessionValidator};
use crate::view::View;

/// Outcome of one boot cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootReport {
    /// Units in the order they started.
    pub units: Vec<String>,
    pub session: SessionState,
    /// Whether a session is stored after validation.
    pub logged_in: bool,
}

pub struct Bootstrap {
    config: BootConfig,
    loader: ModuleLoader,
    store: SessionStore,
    api: Arc<dyn SiteApi>,
    view: Arc<dyn View>,
    session: Mutex<SessionState>,
}

impl Bootstrap {
    pub fn new<R>(
        config: BootConfig,
        resolver: R,
        jar: Arc<dyn CookieJar>,
        api: Arc<dyn SiteApi>,
        view: Arc<dyn View>,
    ) -> Self
    where
        R: UnitResolver + 'static,
    {
        Self {
            config,
            loader: ModuleLoader::new(resolver),
            store: SessionStore::new(jar),
            api,
            view,
            session: Mutex::new(SessionState::Unchecked),
        }
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn validator(&self) -> SessionValidator {
        SessionValidator::new(self.store.clone(), Arc::clone(&self.api), Arc::clone(&self.view))
    }

    pub fn user_info(&self) -> UserInfoFetcher {
        UserInfoFetcher::new(self.store.clone(), Arc::clone(&self.api))
    }

    /// Enqueues the configured units and begins loading them.
    pub fn start(&self) -> Result<()> {
        self.config.check()?;
        self.loader.enqueue_all(self.config.modules.iter().cloned())?;
        info!(target = "pageboot.boot", origin = %self.config.origin, units = self.config.modules.len(), "boot started");
        self.loader.start()?;
        Ok(())
    }

    /// Resolves once every unit has loaded and the drained callbacks ran.
    pub fn drained(&self) -> impl Future<Output = pageboot_runtime::Result<()>> + Send + 'static {
        self.loader.drained()
    }

    /// Runs a whole boot cycle: load every unit, then validate the session.
    ///
    /// Never resolves if a unit fails to advance.
    pub async fn boot(&self) -> Result<BootReport> {
        let drained = self.drained();
        self.start()?;
        drained.await?;
        self.settle().await
    }

    /// Validates the session once the units have drained.
    pub async fn settle(&self) -> Result<BootReport> {
        let state = self.validator().validate().await?;
        *self.session.lock() = state;

        let report = BootReport {
            units: self.loader.loaded(),
            session: state,
            logged_in: self.is_logged_in(),
        };
        info!(target = "pageboot.boot", session = %state, units = report.units.len(), "boot settled");
        Ok(report)
    }

    /// Defers `callback` until every unit has loaded.
    pub fn on_drained<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.loader.register_on_drained(callback);
    }

    /// Whether a well-formed session is stored.
    pub fn is_logged_in(&self) -> bool {
        match self.store.read() {
            Ok(session) => session.is_some(),
            Err(err) => {
                warn!(target = "pageboot.session", error = %err, "session slot unreadable; treating as logged out");
                false
            }
        }
    }

    /// Hands the visitor's user record to `callback`; never called when logged out.
    pub async fn get_user_info<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(UserInfo),
    {
        self.user_info().fetch(callback).await
    }

    /// Session state settled by the last [`settle`](Self::settle).
    pub fn session_state(&self) -> SessionState {
        *self.session.lock()
    }

    /// Ends the session on the server, clears it locally and reloads the view.
    ///
    /// Returns `false` when no session was stored. A session the server no
    /// longer knows (401) is still cleared locally.
    pub async fn logout(&self) -> Result<bool> {
        let Some(session) = self.store.read()? else {
            return Ok(false);
        };

        match self.api.end_session(&session).await {
            Ok(()) => {}
            Err(err) if err.status() == Some(StatusCode::UNAUTHORIZED) => {
                debug!(target = "pageboot.session", "server had already dropped the session");
            }
            Err(err) => return Err(Error::Api(err)),
        }

        self.store.clear()?;
        *self.session.lock() = SessionState::Unchecked;
        info!(target = "pageboot.session", user = session.user_id(), "logged out");
        self.view.reload();
        Ok(true)
    }
}
