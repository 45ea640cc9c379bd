// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted client state: session credentials and user preferences.
//!
//! The on-disk form is one `key:value` pair per line. Absent values are
//! written as `None` and booleans as `True`/`False`, so files written by
//! earlier versions of the client load unchanged.

use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Marker written for absent values.
const ABSENT: &str = "None";

/// Tokens needed to make authenticated listing calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub cookie: String,
}

/// Client state loaded at startup and persisted after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigState {
    /// Account email; present iff the user is logged in
    pub email: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
    /// Session cookie returned by the login handshake
    pub cookie: Option<String>,
    /// Notification preference (persisted and displayed only)
    pub notification_on: bool,
    /// Restrict listings to favorited stores
    pub favorite_only: bool,
}

impl ConfigState {
    /// True iff an account email is recorded.
    pub fn is_connected(&self) -> bool {
        self.email.is_some()
    }

    /// The full credential tuple, if all four parts are present.
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            access_token: self.access_token.clone()?,
            refresh_token: self.refresh_token.clone()?,
            user_id: self.user_id.clone()?,
            cookie: self.cookie.clone()?,
        })
    }

    /// Overwrite the four credential fields. The email is left untouched.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.access_token = Some(credentials.access_token);
        self.refresh_token = Some(credentials.refresh_token);
        self.user_id = Some(credentials.user_id);
        self.cookie = Some(credentials.cookie);
    }

    /// Record a completed login.
    pub fn connect(&mut self, email: &str, credentials: Credentials) {
        self.email = Some(email.to_string());
        self.set_credentials(credentials);
    }

    /// Forget the account and its tokens. Preferences are kept.
    pub fn clear_credentials(&mut self) {
        self.email = None;
        self.access_token = None;
        self.refresh_token = None;
        self.user_id = None;
        self.cookie = None;
    }

    /// Flip the notification flag and return the new value.
    pub fn toggle_notification(&mut self) -> bool {
        self.notification_on = !self.notification_on;
        self.notification_on
    }

    /// Flip the favorites-only flag and return the new value.
    pub fn toggle_favorite_only(&mut self) -> bool {
        self.favorite_only = !self.favorite_only;
        self.favorite_only
    }

    /// Parse the `key:value` file format.
    ///
    /// Every line must contain exactly one `:`. Unknown keys are skipped;
    /// keys that are missing keep their defaults.
    pub fn parse(content: &str) -> Result<Self, StoreError> {
        let mut state = Self::default();

        for (idx, line) in content.lines().enumerate() {
            let mut parts = line.split(':');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(StoreError::Format {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };

            match key {
                "email" => state.email = parse_optional(value),
                "access_token" => state.access_token = parse_optional(value),
                "refresh_token" => state.refresh_token = parse_optional(value),
                "user_id" => state.user_id = parse_optional(value),
                "cookie" => state.cookie = parse_optional(value),
                "notification_on" => state.notification_on = parse_bool(key, value)?,
                "favorite_only" => state.favorite_only = parse_bool(key, value)?,
                other => {
                    tracing::warn!(key = %other, line = idx + 1, "Ignoring unknown config key");
                }
            }
        }

        Ok(state)
    }

    /// Serialize to the `key:value` file format.
    ///
    /// Fails if a value contains the delimiter or a line break, since those
    /// cannot be represented and would corrupt the file.
    pub fn to_file_string(&self) -> Result<String, StoreError> {
        let fields: [(&str, String); 7] = [
            ("email", format_optional("email", &self.email)?),
            ("access_token", format_optional("access_token", &self.access_token)?),
            ("refresh_token", format_optional("refresh_token", &self.refresh_token)?),
            ("user_id", format_optional("user_id", &self.user_id)?),
            ("cookie", format_optional("cookie", &self.cookie)?),
            ("notification_on", format_bool(self.notification_on)),
            ("favorite_only", format_bool(self.favorite_only)),
        ];

        Ok(fields
            .iter()
            .map(|(key, value)| format!("{}:{}\n", key, value))
            .collect())
    }
}

fn parse_optional(value: &str) -> Option<String> {
    if value == ABSENT {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, StoreError> {
    match value {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        _ => Err(StoreError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn format_optional(key: &str, value: &Option<String>) -> Result<String, StoreError> {
    match value {
        None => Ok(ABSENT.to_string()),
        Some(v) if v.contains(|c| matches!(c, ':' | '\n' | '\r')) => Err(StoreError::ReservedCharacter {
            key: key.to_string(),
        }),
        Some(v) => Ok(v.clone()),
    }
}

fn format_bool(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}
