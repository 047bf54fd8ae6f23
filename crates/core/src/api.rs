//! Remote calls to the site API.
//!
//! [`SiteApi`] is the seam the validator and user lookup talk through;
//! [`HttpApi`] implements it over `reqwest` against `{origin}/api`.

use async_trait::async_trait;
use pageboot_protocol::UserInfo;
#[cfg(not(target_arch = "wasm32"))]
use pageboot_protocol::SESSION_COOKIE;
use reqwest::header::CONTENT_TYPE;
#[cfg(not(target_arch = "wasm32"))]
use reqwest::header::COOKIE;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::descriptor::SessionDescriptor;

/// Path of the session validation endpoint, relative to the API base.
pub const VALIDATE_PATH: &str = "/sessions/validate/";

/// Path of the session endpoint; `DELETE` ends the caller's session.
pub const SESSIONS_PATH: &str = "/sessions/";

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Returns the lookup path for a user.
pub fn user_path(user_id: &str) -> String {
    format!("/users/{user_id}")
}

/// Failures of a remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },

    #[error("{url} returned malformed JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid site origin '{0}'")]
    InvalidOrigin(String),
}

impl ApiError {
    /// HTTP status for non-success answers.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Site page that explains a non-success answer, e.g. `/errors/404`.
    pub fn error_page(&self) -> Option<String> {
        self.status()
            .map(|status| format!("/errors/{}", status.as_u16()))
    }
}

/// Remote operations the bootstrap depends on.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait SiteApi: Send + Sync {
    /// Asks the server whether `session` is still accepted; returns the raw reply.
    async fn validate_session(&self, session: &SessionDescriptor) -> Result<Value, ApiError>;

    /// Looks up the user owning `session`.
    async fn user(&self, session: &SessionDescriptor) -> Result<UserInfo, ApiError>;

    /// Revokes `session` on the server.
    async fn end_session(&self, session: &SessionDescriptor) -> Result<(), ApiError>;
}

/// [`SiteApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    /// Builds a client for `{origin}{api_path}`, e.g. `https://example.com/api`.
    pub fn new(origin: &str, api_path: &str) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), origin, api_path)
    }

    pub fn with_client(client: Client, origin: &str, api_path: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(origin).map_err(|_| ApiError::InvalidOrigin(origin.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidOrigin(origin.to_string()));
        }
        let base = format!(
            "{}{}",
            origin.trim_end_matches('/'),
            api_path.trim_end_matches('/')
        );
        Ok(Self { client, base })
    }

    /// Full URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        session: &SessionDescriptor,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path);
        debug!(target = "pageboot.api", %method, %url, "api call");

        let request = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        let response = with_session_cookie(request, session)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(target = "pageboot.api", %url, %status, "api call rejected");
            return Err(ApiError::Status { url, status });
        }
        Ok(response)
    }

    async fn get_json<T>(&self, path: &str, session: &SessionDescriptor) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.call(Method::GET, path, session).await?;
        let url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn with_session_cookie(request: RequestBuilder, session: &SessionDescriptor) -> RequestBuilder {
    request.header(COOKIE, format!("{SESSION_COOKIE}={}", session.encode()))
}

// Browsers attach the cookie themselves and drop a manual `Cookie` header.
#[cfg(target_arch = "wasm32")]
fn with_session_cookie(request: RequestBuilder, _session: &SessionDescriptor) -> RequestBuilder {
    request
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SiteApi for HttpApi {
    async fn validate_session(&self, session: &SessionDescriptor) -> Result<Value, ApiError> {
        self.get_json(VALIDATE_PATH, session).await
    }

    async fn user(&self, session: &SessionDescriptor) -> Result<UserInfo, ApiError> {
        self.get_json(&user_path(session.user_id()), session).await
    }

    async fn end_session(&self, session: &SessionDescriptor) -> Result<(), ApiError> {
        self.call(Method::DELETE, SESSIONS_PATH, session).await?;
        Ok(())
    }
}
