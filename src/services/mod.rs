// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod deals;
pub mod poller;
pub mod tgtg;

pub use auth::{AuthService, LoginError};
pub use deals::DealService;
pub use poller::{DealSnapshot, Poller, MIN_POLL_INTERVAL};
pub use tgtg::{ApiError, MarketplaceApi, PendingLogin, TgtgClient};
