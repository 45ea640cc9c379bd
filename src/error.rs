// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

use crate::services::auth::LoginError;
use crate::services::tgtg::ApiError;
use crate::store::StoreError;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not logged in")]
    NotConnected,

    #[error("Marketplace API error: {0}")]
    Api(#[from] ApiError),

    #[error("Config store error: {0}")]
    Store(#[from] StoreError),

    #[error("Login failed: {0}")]
    Login(#[from] LoginError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True if the API rejected the access token (expired or revoked).
    pub fn is_token_error(&self) -> bool {
        matches!(self, AppError::Api(ApiError::Unauthorized))
    }
}

/// Result type alias for application operations
pub type Result<T> = std::result::Result<T, AppError>;
