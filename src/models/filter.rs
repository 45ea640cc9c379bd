// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Listing filter presets.

use geo::Point;

/// Where to search: a fixed origin and the radius used by each preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    /// Search origin (x = longitude, y = latitude)
    pub origin: Point<f64>,
    /// Radius for the unrestricted preset, in km
    pub radius_km: u32,
    /// Radius for the favorites preset, in km
    pub favorites_radius_km: u32,
    /// Number of items requested per listing call
    pub page_size: u32,
}

/// The two fixed filter presets, selected by the favorites-only preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPreset {
    /// Favorited stores with stock left
    Favorites,
    /// Everything around the origin, sold out or not
    Unrestricted,
}

/// Concrete parameters for one listing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingFilter {
    pub origin: Point<f64>,
    pub radius_km: u32,
    pub favorites_only: bool,
    pub with_stock_only: bool,
    pub page_size: u32,
}

impl FilterPreset {
    pub fn from_favorite_only(favorite_only: bool) -> Self {
        if favorite_only {
            Self::Favorites
        } else {
            Self::Unrestricted
        }
    }

    pub fn to_filter(self, area: &SearchArea) -> ListingFilter {
        match self {
            Self::Favorites => ListingFilter {
                origin: area.origin,
                radius_km: area.favorites_radius_km,
                favorites_only: true,
                with_stock_only: true,
                page_size: area.page_size,
            },
            Self::Unrestricted => ListingFilter {
                origin: area.origin,
                radius_km: area.radius_km,
                favorites_only: false,
                with_stock_only: false,
                page_size: area.page_size,
            },
        }
    }
}

impl ListingFilter {
    pub fn latitude(&self) -> f64 {
        self.origin.y()
    }

    pub fn longitude(&self) -> f64 {
        self.origin.x()
    }
}
