// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! tgtg-tracker: log in to the Too Good To Go marketplace and watch nearby deals
//!
//! This crate provides the session/config store, the marketplace API client,
//! and the deal polling loop used by the `tgtg-tracker` command-line tool.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use services::{AuthService, DealService, MarketplaceApi, TgtgClient};
use std::sync::Arc;
use store::ConfigStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: ConfigStore,
    pub auth: AuthService,
    pub deals: DealService,
}

impl AppState {
    /// Wire services to an API implementation.
    pub fn with_api(config: Config, api: Arc<dyn MarketplaceApi>) -> Self {
        Self {
            store: ConfigStore::new(config.config_file.clone()),
            auth: AuthService::from_config(api.clone(), &config),
            deals: DealService::from_config(api, &config),
            config,
        }
    }

    /// Wire services to the HTTP marketplace client.
    pub fn from_config(config: Config) -> Result<Self, services::ApiError> {
        let api = Arc::new(TgtgClient::new(&config)?);
        Ok(Self::with_api(config, api))
    }
}
