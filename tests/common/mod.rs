// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tgtg_tracker::models::{Credentials, ListingFilter, RawItem};
use tgtg_tracker::services::{ApiError, MarketplaceApi, PendingLogin};
use tgtg_tracker::store::ConfigStore;
use uuid::Uuid;

/// Credentials used across tests.
#[allow(dead_code)]
pub fn test_credentials() -> Credentials {
    Credentials {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        user_id: "1001".to_string(),
        cookie: "datadome=abc".to_string(),
    }
}

/// Build a listing record the way the API returns it.
#[allow(dead_code)]
pub fn raw_item(name: &str, minor_units: i64, with_pickup: bool) -> RawItem {
    let mut value = json!({
        "display_name": name,
        "item": {
            "item_id": "1",
            "price_including_taxes": {"code": "EUR", "minor_units": minor_units, "decimals": 2}
        },
        "items_available": 1
    });
    if with_pickup {
        value["pickup_interval"] = json!({
            "start": "2026-10-18T16:00:00Z",
            "end": "2026-10-18T16:30:00Z"
        });
    }
    serde_json::from_value(value).expect("valid raw item")
}

/// Config store in a fresh temp directory. Remove the directory when done.
#[allow(dead_code)]
pub fn temp_store() -> (PathBuf, ConfigStore) {
    let dir = std::env::temp_dir().join(format!("tgtg_test_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let store = ConfigStore::new(dir.join("config.txt"));
    (dir, store)
}

// ─────────────────────────────────────────────────────────────────────────────
// In-process stub of the marketplace API
// ─────────────────────────────────────────────────────────────────────────────

/// How the stub answers login calls.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum LoginBehavior {
    /// Confirm on the given poll (1-based)
    ConfirmOnPoll(u32),
    /// Never confirm
    NeverConfirm,
    /// Refuse the email outright
    RejectEmail,
    /// Fail every call with a network error
    NetworkDown,
}

/// Recording stub for [`MarketplaceApi`].
#[allow(dead_code)]
pub struct StubApi {
    pub login: LoginBehavior,
    pub items: Vec<RawItem>,
    pub login_requests: Mutex<Vec<String>>,
    pub polls: AtomicU32,
    pub refreshes: AtomicU32,
    pub listing_filters: Mutex<Vec<ListingFilter>>,
    pub listing_tokens: Mutex<Vec<String>>,
    /// Access tokens the listing call rejects as expired
    pub expired_tokens: Mutex<HashSet<String>>,
    /// Fail listing calls with HTTP 500
    pub listing_down: Mutex<bool>,
}

#[allow(dead_code)]
impl StubApi {
    pub fn new(login: LoginBehavior, items: Vec<RawItem>) -> Self {
        Self {
            login,
            items,
            login_requests: Mutex::new(Vec::new()),
            polls: AtomicU32::new(0),
            refreshes: AtomicU32::new(0),
            listing_filters: Mutex::new(Vec::new()),
            listing_tokens: Mutex::new(Vec::new()),
            expired_tokens: Mutex::new(HashSet::new()),
            listing_down: Mutex::new(false),
        }
    }

    pub fn with_items(items: Vec<RawItem>) -> Self {
        Self::new(LoginBehavior::ConfirmOnPoll(1), items)
    }

    pub fn expire(&self, access_token: &str) {
        self.expired_tokens
            .lock()
            .unwrap()
            .insert(access_token.to_string());
    }

    pub fn set_listing_down(&self, down: bool) {
        *self.listing_down.lock().unwrap() = down;
    }

    pub fn filters(&self) -> Vec<ListingFilter> {
        self.listing_filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketplaceApi for StubApi {
    async fn request_login(&self, email: &str) -> Result<PendingLogin, ApiError> {
        self.login_requests.lock().unwrap().push(email.to_string());
        match self.login {
            LoginBehavior::NetworkDown => Err(ApiError::Network("connection refused".into())),
            LoginBehavior::RejectEmail => Err(ApiError::Rejected("no account".into())),
            _ => Ok(PendingLogin {
                email: email.to_string(),
                polling_id: "poll-1".to_string(),
            }),
        }
    }

    async fn poll_login(&self, _pending: &PendingLogin) -> Result<Option<Credentials>, ApiError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.login {
            LoginBehavior::ConfirmOnPoll(n) if poll >= n => Ok(Some(test_credentials())),
            LoginBehavior::NetworkDown => Err(ApiError::Network("connection refused".into())),
            _ => Ok(None),
        }
    }

    async fn refresh_session(&self, credentials: &Credentials) -> Result<Credentials, ApiError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 2;
        Ok(Credentials {
            access_token: format!("access-{}", n),
            refresh_token: format!("refresh-{}", n),
            user_id: credentials.user_id.clone(),
            cookie: credentials.cookie.clone(),
        })
    }

    async fn list_deals(
        &self,
        credentials: &Credentials,
        filter: &ListingFilter,
    ) -> Result<Vec<RawItem>, ApiError> {
        self.listing_filters.lock().unwrap().push(*filter);
        self.listing_tokens
            .lock()
            .unwrap()
            .push(credentials.access_token.clone());

        if *self.listing_down.lock().unwrap() {
            return Err(ApiError::Status {
                status: 500,
                body: "down".into(),
            });
        }
        if self
            .expired_tokens
            .lock()
            .unwrap()
            .contains(&credentials.access_token)
        {
            return Err(ApiError::Unauthorized);
        }
        Ok(self.items.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP stub of the marketplace, for exercising TgtgClient end to end
// ─────────────────────────────────────────────────────────────────────────────

/// One request seen by the stub server.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: &'static str,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Default)]
struct ServerState {
    requests: Mutex<Vec<RecordedRequest>>,
    polls: AtomicU32,
}

impl ServerState {
    fn record(&self, path: &'static str, headers: HeaderMap, body: Value) {
        self.requests.lock().unwrap().push(RecordedRequest {
            path,
            headers,
            body,
        });
    }
}

/// Running stub server.
#[allow(dead_code)]
pub struct StubServer {
    pub base_url: String,
    state: Arc<ServerState>,
}

#[allow(dead_code)]
impl StubServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

/// Email the stub treats as having no account.
#[allow(dead_code)]
pub const UNKNOWN_EMAIL: &str = "new@user.test";

async fn auth_by_email(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    state.record("authByEmail", headers, body);

    if email == UNKNOWN_EMAIL {
        return Json(json!({"state": "TERMS"})).into_response();
    }
    Json(json!({"state": "WAIT", "polling_id": "poll-abc"})).into_response()
}

async fn auth_polling(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("authByRequestPollingId", headers, body);

    // First check: user has not clicked the link yet
    if state.polls.fetch_add(1, Ordering::SeqCst) == 0 {
        return StatusCode::ACCEPTED.into_response();
    }

    (
        AppendHeaders([
            (header::SET_COOKIE, "datadome=dd-123; Max-Age=31536000; Path=/"),
            (header::SET_COOKIE, "session=s-456; HttpOnly"),
        ]),
        Json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "access_token_ttl_seconds": 172800,
            "startup_data": {"user": {"user_id": "1001", "name": "Test"}}
        })),
    )
        .into_response()
}

async fn refresh(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("refresh", headers, body);
    Json(json!({"access_token": "access-2", "refresh_token": "refresh-2"})).into_response()
}

async fn items(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.record("items", headers, body);

    match auth.as_str() {
        "Bearer expired" => StatusCode::UNAUTHORIZED.into_response(),
        "Bearer busy" => StatusCode::TOO_MANY_REQUESTS.into_response(),
        "Bearer broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!({
            "items": [
                {
                    "item": {
                        "item_id": "1",
                        "price_including_taxes": {"code": "EUR", "minor_units": 399, "decimals": 2}
                    },
                    "store": {"store_name": "Boulangerie Paul"},
                    "display_name": "Boulangerie Paul (Panier)",
                    "pickup_interval": {
                        "start": "2026-10-18T16:00:00Z",
                        "end": "2026-10-18T16:30:00Z"
                    },
                    "items_available": 3,
                    "favorite": true
                },
                {
                    "item": {
                        "item_id": "2",
                        "price_including_taxes": {"code": "EUR", "minor_units": 450, "decimals": 2}
                    },
                    "display_name": "Sushi Shop",
                    "items_available": 0
                }
            ]
        }))
        .into_response(),
    }
}

/// Start the stub marketplace on a random local port.
#[allow(dead_code)]
pub async fn spawn_stub_server() -> StubServer {
    let state = Arc::new(ServerState::default());

    let app = Router::new()
        .route("/api/auth/v5/authByEmail", post(auth_by_email))
        .route("/api/auth/v5/authByRequestPollingId", post(auth_polling))
        .route("/api/token/v1/refresh", post(refresh))
        .route("/api/item/v8/", post(items))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    StubServer {
        base_url: format!("http://{}/api/", addr),
        state,
    }
}
