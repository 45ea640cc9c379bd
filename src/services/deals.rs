// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deal fetching with the preset chosen by the favorites-only preference.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ConfigState, DealItem, FilterPreset, SearchArea};
use crate::services::tgtg::{ApiError, MarketplaceApi};
use crate::store::ConfigStore;
use std::sync::Arc;

/// Fetches the current deal list for the stored session.
#[derive(Clone)]
pub struct DealService {
    api: Arc<dyn MarketplaceApi>,
    area: SearchArea,
}

impl DealService {
    pub fn new(api: Arc<dyn MarketplaceApi>, area: SearchArea) -> Self {
        Self { api, area }
    }

    pub fn from_config(api: Arc<dyn MarketplaceApi>, config: &Config) -> Self {
        Self::new(api, config.search_area())
    }

    pub fn area(&self) -> &SearchArea {
        &self.area
    }

    /// List deals once.
    ///
    /// If the access token is rejected, the session is refreshed, persisted,
    /// and the listing retried a single time.
    pub async fn fetch_deals(
        &self,
        store: &ConfigStore,
        state: &mut ConfigState,
    ) -> Result<Vec<DealItem>, AppError> {
        if !state.is_connected() {
            return Err(AppError::NotConnected);
        }
        let credentials = state.credentials().ok_or(AppError::NotConnected)?;

        let preset = FilterPreset::from_favorite_only(state.favorite_only);
        let filter = preset.to_filter(&self.area);

        let raw_items = match self.api.list_deals(&credentials, &filter).await {
            Ok(items) => items,
            Err(ApiError::Unauthorized) => {
                tracing::info!(user_id = %credentials.user_id, "Access token rejected, refreshing");
                let refreshed = self.api.refresh_session(&credentials).await?;
                store.set_credentials(state, refreshed.clone())?;
                self.api.list_deals(&refreshed, &filter).await?
            }
            Err(e) => return Err(e.into()),
        };

        let deals: Vec<DealItem> = raw_items.into_iter().map(DealItem::from).collect();
        tracing::info!(count = deals.len(), preset = ?preset, "Fetched deals");
        Ok(deals)
    }
}
