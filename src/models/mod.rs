// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod config_state;
pub mod deal;
pub mod filter;

pub use config_state::{ConfigState, Credentials};
pub use deal::{DealItem, RawItem};
pub use filter::{FilterPreset, ListingFilter, SearchArea};
