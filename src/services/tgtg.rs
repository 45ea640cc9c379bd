// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace API client.
//!
//! Handles:
//! - Email login (request a link, then poll until the user confirms)
//! - Session refresh
//! - Deal listing around a fixed origin
//!
//! [`MarketplaceApi`] is the seam the services depend on; [`TgtgClient`] is
//! the HTTP implementation.

use crate::config::Config;
use crate::models::{Credentials, ListingFilter, RawItem};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEVICE_TYPE: &str = "ANDROID";

const AUTH_BY_EMAIL_PATH: &str = "auth/v5/authByEmail";
const AUTH_POLLING_PATH: &str = "auth/v5/authByRequestPollingId";
const REFRESH_PATH: &str = "token/v1/refresh";
const ITEMS_PATH: &str = "item/v8/";

/// Errors from marketplace API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Access token rejected")]
    Unauthorized,

    #[error("Rate limited by the marketplace API")]
    RateLimited,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// A login request waiting for the user to click the emailed link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogin {
    pub email: String,
    pub polling_id: String,
}

/// Operations this crate needs from the marketplace.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Ask the service to email a login link.
    async fn request_login(&self, email: &str) -> Result<PendingLogin, ApiError>;

    /// Check once whether the login was confirmed. `Ok(None)` means still waiting.
    async fn poll_login(&self, pending: &PendingLogin) -> Result<Option<Credentials>, ApiError>;

    /// Exchange the refresh token for a fresh credential set.
    async fn refresh_session(&self, credentials: &Credentials) -> Result<Credentials, ApiError>;

    /// List deals matching `filter`.
    async fn list_deals(
        &self,
        credentials: &Credentials,
        filter: &ListingFilter,
    ) -> Result<Vec<RawItem>, ApiError>;
}

/// HTTP client for the marketplace API.
#[derive(Clone)]
pub struct TgtgClient {
    http: reqwest::Client,
    base_url: String,
}

impl TgtgClient {
    /// Create a client from process configuration.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| ApiError::Client(format!("Invalid language header: {}", e)))?,
        );

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST a JSON body, optionally with session cookie and bearer token.
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        credentials: Option<&Credentials>,
        bearer: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.http.post(self.url(path)).json(body);

        if let Some(creds) = credentials {
            if !creds.cookie.is_empty() {
                request = request.header(COOKIE, creds.cookie.as_str());
            }
            if bearer {
                request = request.bearer_auth(&creds.access_token);
            }
        }

        request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    /// Check response status and return error if not successful.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Marketplace rate limit hit (429)");
            return Err(ApiError::RateLimited);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl MarketplaceApi for TgtgClient {
    async fn request_login(&self, email: &str) -> Result<PendingLogin, ApiError> {
        let body = AuthByEmailRequest {
            device_type: DEVICE_TYPE,
            email,
        };
        let response = self.post(AUTH_BY_EMAIL_PATH, &body, None, false).await?;
        let response = Self::check_response(response).await?;
        let parsed: AuthByEmailResponse = Self::parse_json(response).await?;

        match parsed.state.as_str() {
            "TERMS" => Err(ApiError::Rejected(format!(
                "{} has no account yet; sign up in the marketplace app first",
                email
            ))),
            "WAIT" => {
                let polling_id = parsed
                    .polling_id
                    .ok_or_else(|| ApiError::Decode("WAIT response without polling_id".into()))?;
                tracing::info!(email, "Login link requested");
                Ok(PendingLogin {
                    email: email.to_string(),
                    polling_id,
                })
            }
            other => Err(ApiError::Decode(format!("Unknown login state: {}", other))),
        }
    }

    async fn poll_login(&self, pending: &PendingLogin) -> Result<Option<Credentials>, ApiError> {
        let body = AuthPollingRequest {
            device_type: DEVICE_TYPE,
            email: &pending.email,
            request_polling_id: &pending.polling_id,
        };
        let response = self.post(AUTH_POLLING_PATH, &body, None, false).await?;

        if response.status() == StatusCode::ACCEPTED {
            return Ok(None);
        }

        let response = Self::check_response(response).await?;
        let cookie = session_cookie(response.headers()).unwrap_or_default();
        let parsed: AuthPollingResponse = Self::parse_json(response).await?;

        Ok(Some(Credentials {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            user_id: parsed.startup_data.user.user_id,
            cookie,
        }))
    }

    async fn refresh_session(&self, credentials: &Credentials) -> Result<Credentials, ApiError> {
        let body = RefreshRequest {
            refresh_token: &credentials.refresh_token,
        };
        let response = self
            .post(REFRESH_PATH, &body, Some(credentials), false)
            .await?;
        let response = Self::check_response(response).await?;
        let cookie = session_cookie(response.headers());
        let parsed: RefreshResponse = Self::parse_json(response).await?;

        tracing::info!(user_id = %credentials.user_id, "Session refreshed");
        Ok(Credentials {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            user_id: credentials.user_id.clone(),
            cookie: cookie.unwrap_or_else(|| credentials.cookie.clone()),
        })
    }

    async fn list_deals(
        &self,
        credentials: &Credentials,
        filter: &ListingFilter,
    ) -> Result<Vec<RawItem>, ApiError> {
        let body = ItemsRequest {
            user_id: &credentials.user_id,
            origin: Origin {
                latitude: filter.latitude(),
                longitude: filter.longitude(),
            },
            radius: filter.radius_km,
            page_size: filter.page_size,
            page: 1,
            discover: false,
            favorites_only: filter.favorites_only,
            item_categories: Vec::new(),
            diet_categories: Vec::new(),
            with_stock_only: filter.with_stock_only,
            hidden_only: false,
            we_care_only: false,
        };
        let response = self.post(ITEMS_PATH, &body, Some(credentials), true).await?;
        let response = Self::check_response(response).await?;
        let parsed: ItemsResponse = Self::parse_json(response).await?;

        Ok(parsed.items)
    }
}

/// Join the `name=value` part of every `Set-Cookie` header.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|val| val.to_str().ok())
        .filter_map(|s| s.split(';').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AuthByEmailRequest<'a> {
    device_type: &'a str,
    email: &'a str,
}

#[derive(Deserialize)]
struct AuthByEmailResponse {
    state: String,
    #[serde(default)]
    polling_id: Option<String>,
}

#[derive(Serialize)]
struct AuthPollingRequest<'a> {
    device_type: &'a str,
    email: &'a str,
    request_polling_id: &'a str,
}

#[derive(Deserialize)]
struct AuthPollingResponse {
    access_token: String,
    refresh_token: String,
    startup_data: StartupData,
}

#[derive(Deserialize)]
struct StartupData {
    user: StartupUser,
}

#[derive(Deserialize)]
struct StartupUser {
    user_id: String,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Serialize)]
struct Origin {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize)]
struct ItemsRequest<'a> {
    user_id: &'a str,
    origin: Origin,
    radius: u32,
    page_size: u32,
    page: u32,
    discover: bool,
    favorites_only: bool,
    item_categories: Vec<String>,
    diet_categories: Vec<String>,
    with_stock_only: bool,
    hidden_only: bool,
    we_care_only: bool,
}

#[derive(Deserialize)]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}
