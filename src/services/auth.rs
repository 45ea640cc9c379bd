// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, logout and session refresh.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ConfigState, Credentials};
use crate::services::tgtg::{ApiError, MarketplaceApi, PendingLogin};
use crate::store::{ConfigStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

/// Why a login attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Could not reach the marketplace: {0}")]
    Network(String),

    #[error("Login was not confirmed after {attempts} checks")]
    Timeout { attempts: u32 },

    #[error("Login rejected: {0}")]
    Rejected(String),

    #[error("Too many login attempts, try again later")]
    RateLimited,

    #[error(transparent)]
    Api(ApiError),

    #[error("Login succeeded but credentials could not be saved: {0}")]
    Persist(#[from] StoreError),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => LoginError::Network(msg),
            ApiError::RateLimited => LoginError::RateLimited,
            ApiError::Rejected(msg) => LoginError::Rejected(msg),
            ApiError::Unauthorized => LoginError::Rejected("access denied".to_string()),
            ApiError::Status { status, body } if (400..500).contains(&status) => {
                LoginError::Rejected(format!("HTTP {}: {}", status, body))
            }
            other => LoginError::Api(other),
        }
    }
}

#[derive(Validate)]
struct LoginRequest {
    #[validate(email)]
    email: String,
}

/// Drives the email-confirmation login and keeps the stored session current.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn MarketplaceApi>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl AuthService {
    pub fn new(api: Arc<dyn MarketplaceApi>, poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            api,
            poll_interval,
            max_attempts,
        }
    }

    pub fn from_config(api: Arc<dyn MarketplaceApi>, config: &Config) -> Self {
        Self::new(
            api,
            Duration::from_secs(config.login_poll_interval_secs),
            config.login_max_attempts,
        )
    }

    /// Validate the address and ask the service to email a login link.
    pub async fn start_login(&self, email: &str) -> Result<PendingLogin, LoginError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
        };
        request
            .validate()
            .map_err(|_| LoginError::InvalidEmail(email.to_string()))?;

        Ok(self.api.request_login(&request.email).await?)
    }

    /// Poll until the user confirms the emailed link or attempts run out.
    pub async fn await_confirmation(
        &self,
        pending: &PendingLogin,
    ) -> Result<Credentials, LoginError> {
        for attempt in 1..=self.max_attempts {
            if let Some(credentials) = self.api.poll_login(pending).await? {
                tracing::info!(email = %pending.email, attempt, "Login confirmed");
                return Ok(credentials);
            }

            tracing::debug!(email = %pending.email, attempt, "Login not confirmed yet");
            if attempt < self.max_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        tracing::warn!(
            email = %pending.email,
            attempts = self.max_attempts,
            "Login confirmation timed out"
        );
        Err(LoginError::Timeout {
            attempts: self.max_attempts,
        })
    }

    /// Full login: request link, wait for confirmation, persist the session.
    pub async fn login(
        &self,
        store: &ConfigStore,
        state: &mut ConfigState,
        email: &str,
    ) -> Result<Credentials, LoginError> {
        self.login_with(store, state, email, |_| {}).await
    }

    /// Like [`login`](Self::login), calling `on_link_sent` once the
    /// confirmation email has been requested.
    pub async fn login_with<F>(
        &self,
        store: &ConfigStore,
        state: &mut ConfigState,
        email: &str,
        on_link_sent: F,
    ) -> Result<Credentials, LoginError>
    where
        F: FnOnce(&PendingLogin),
    {
        let pending = self.start_login(email).await?;
        on_link_sent(&pending);
        let credentials = self.await_confirmation(&pending).await?;
        store.connect(state, &pending.email, credentials.clone())?;
        Ok(credentials)
    }

    /// Forget the stored session.
    pub fn logout(&self, store: &ConfigStore, state: &mut ConfigState) -> Result<(), StoreError> {
        store.clear_credentials(state)?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Exchange the stored refresh token for new credentials and persist them.
    pub async fn refresh(
        &self,
        store: &ConfigStore,
        state: &mut ConfigState,
    ) -> Result<Credentials, AppError> {
        let current = state.credentials().ok_or(AppError::NotConnected)?;
        let refreshed = self.api.refresh_session(&current).await?;
        store.set_credentials(state, refreshed.clone())?;
        Ok(refreshed)
    }
}
