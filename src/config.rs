// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process configuration loaded from environment variables.
//!
//! This is separate from the persisted client state in the config file: it
//! covers where that file lives, how to reach the API, and where to search.

use crate::models::SearchArea;
use geo::Point;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the `key:value` state file
    pub config_file: PathBuf,
    /// Marketplace API base URL
    pub api_base_url: String,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Accept-Language sent with every request
    pub accept_language: String,
    /// Search origin latitude
    pub latitude: f64,
    /// Search origin longitude
    pub longitude: f64,
    /// Radius for the unrestricted listing, in km
    pub radius_km: u32,
    /// Radius for the favorites listing, in km
    pub favorites_radius_km: u32,
    /// Items requested per listing call
    pub page_size: u32,
    /// Seconds between deal polls
    pub poll_interval_secs: u64,
    /// Seconds between login confirmation checks
    pub login_poll_interval_secs: u64,
    /// Confirmation checks before a login times out
    pub login_max_attempts: u32,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

const DEFAULT_API_URL: &str = "https://apptoogoodtogo.com/api/";
const DEFAULT_USER_AGENT: &str =
    "TGTG/24.11.0 Dalvik/2.1.0 (Linux; U; Android 14; Pixel 7 Build/UQ1A.240105.004)";

impl Default for Config {
    /// Default config, also used by tests.
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("config.txt"),
            api_base_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "fr-FR".to_string(),
            latitude: 49.4427202,
            longitude: 1.0933836,
            radius_km: 21,
            favorites_radius_km: 10,
            page_size: 20,
            poll_interval_secs: 60,
            login_poll_interval_secs: 5,
            login_max_attempts: 24,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Every variable is optional and falls back to [`Config::default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            config_file: env::var("TGTG_CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_file),
            api_base_url: env::var("TGTG_API_URL").unwrap_or(defaults.api_base_url),
            user_agent: env::var("TGTG_USER_AGENT").unwrap_or(defaults.user_agent),
            accept_language: env::var("TGTG_LANGUAGE").unwrap_or(defaults.accept_language),
            latitude: parse_var("TGTG_LATITUDE", defaults.latitude)?,
            longitude: parse_var("TGTG_LONGITUDE", defaults.longitude)?,
            radius_km: parse_var("TGTG_RADIUS_KM", defaults.radius_km)?,
            favorites_radius_km: parse_var(
                "TGTG_FAVORITES_RADIUS_KM",
                defaults.favorites_radius_km,
            )?,
            page_size: parse_var("TGTG_PAGE_SIZE", defaults.page_size)?,
            poll_interval_secs: parse_var("TGTG_POLL_INTERVAL_SECS", defaults.poll_interval_secs)?,
            login_poll_interval_secs: parse_var(
                "TGTG_LOGIN_POLL_INTERVAL_SECS",
                defaults.login_poll_interval_secs,
            )?,
            login_max_attempts: parse_var("TGTG_LOGIN_MAX_ATTEMPTS", defaults.login_max_attempts)?,
            request_timeout_secs: parse_var(
                "TGTG_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
        })
    }

    /// Search origin and radii for the listing presets.
    pub fn search_area(&self) -> SearchArea {
        SearchArea {
            origin: Point::new(self.longitude, self.latitude),
            radius_km: self.radius_km,
            favorites_radius_km: self.favorites_radius_km,
            page_size: self.page_size,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: name,
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
