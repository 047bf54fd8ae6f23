//! In-process stand-in for the site API.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Json, Router};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use pageboot_protocol::{SESSION_COOKIE, cookie_value};
use parking_lot::Mutex;
use serde_json::{Value, json};

#[derive(Default)]
pub struct SiteState {
    pub validate_reply: Mutex<Value>,
    pub validate_status: Mutex<Option<StatusCode>>,
    pub end_status: Mutex<Option<StatusCode>>,
    pub validate_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    pub end_calls: AtomicUsize,
    pub cookies_seen: Mutex<Vec<String>>,
}

impl SiteState {
    pub fn reply_with(&self, reply: Value) {
        *self.validate_reply.lock() = reply;
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn end_calls(&self) -> usize {
        self.end_calls.load(Ordering::SeqCst)
    }

    fn record_cookie(&self, headers: &HeaderMap) {
        if let Some(session) = headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| cookie_value(value, SESSION_COOKIE))
        {
            self.cookies_seen.lock().push(session);
        }
    }
}

pub struct MockSite {
    pub addr: SocketAddr,
    pub state: Arc<SiteState>,
}

impl MockSite {
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn validate(State(state): State<Arc<SiteState>>, headers: HeaderMap) -> Response {
    state.validate_calls.fetch_add(1, Ordering::SeqCst);
    state.record_cookie(&headers);
    if let Some(status) = *state.validate_status.lock() {
        return status.into_response();
    }
    Json(state.validate_reply.lock().clone()).into_response()
}

async fn user(
    State(state): State<Arc<SiteState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.user_calls.fetch_add(1, Ordering::SeqCst);
    state.record_cookie(&headers);
    if id == "404" {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "id": id,
        "username": format!("user{id}"),
        "display_name": format!("User {id}"),
    }))
    .into_response()
}

async fn end_session(State(state): State<Arc<SiteState>>, headers: HeaderMap) -> StatusCode {
    state.end_calls.fetch_add(1, Ordering::SeqCst);
    state.record_cookie(&headers);
    state.end_status.lock().unwrap_or(StatusCode::NO_CONTENT)
}

pub async fn spawn_site() -> MockSite {
    let state = Arc::new(SiteState::default());
    state.reply_with(json!(true));

    let app = Router::new()
        .route("/api/sessions/validate/", get(validate))
        .route("/api/sessions/", delete(end_session))
        .route("/api/users/{id}", get(user))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockSite { addr, state }
}
