// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deal model: one surplus-food offer from a listing response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing record as returned by the marketplace API.
///
/// Only the fields we read are declared; everything else is ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawItem {
    pub display_name: String,
    pub item: RawItemDetails,
    #[serde(default)]
    pub pickup_interval: Option<RawPickupInterval>,
}

/// Nested `item` object of a listing record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawItemDetails {
    pub price_including_taxes: RawPrice,
}

/// Price in the currency's smallest unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPrice {
    pub minor_units: i64,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_decimals() -> u32 {
    2
}

/// Time window during which the offer can be collected.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPickupInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Normalized deal shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealItem {
    /// Store and bag name as displayed by the marketplace
    pub name: String,
    /// Price including taxes, in the currency's smallest unit
    pub price_minor_units: i64,
    /// ISO 4217 currency code, when the API provides one
    pub currency: Option<String>,
    /// Number of minor-unit digits
    pub decimals: u32,
    pub pickup_start: Option<DateTime<Utc>>,
    pub pickup_end: Option<DateTime<Utc>>,
}

impl From<RawItem> for DealItem {
    fn from(raw: RawItem) -> Self {
        let price = raw.item.price_including_taxes;
        let (pickup_start, pickup_end) = match raw.pickup_interval {
            Some(interval) => (Some(interval.start), Some(interval.end)),
            None => (None, None),
        };

        Self {
            name: raw.display_name,
            price_minor_units: price.minor_units,
            currency: price.code,
            decimals: price.decimals,
            pickup_start,
            pickup_end,
        }
    }
}

impl TryFrom<serde_json::Value> for DealItem {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        serde_json::from_value::<RawItem>(value).map(Self::from)
    }
}

impl DealItem {
    /// Price formatted in major units, e.g. `3.99 EUR`.
    ///
    /// Falls back to the raw minor units when `decimals` is too large to
    /// scale by.
    pub fn display_price(&self) -> String {
        let sign = if self.price_minor_units < 0 { "-" } else { "" };
        let units = self.price_minor_units.unsigned_abs();
        let amount = match 10_u64.checked_pow(self.decimals) {
            Some(divisor) if self.decimals > 0 => format!(
                "{}{}.{:0width$}",
                sign,
                units / divisor,
                units % divisor,
                width = self.decimals as usize
            ),
            _ => format!("{}{}", sign, units),
        };

        match &self.currency {
            Some(code) => format!("{} {}", amount, code),
            None => amount,
        }
    }
}
