// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a pickup window as `HH:MM-HH:MM` in the given timezone.
pub fn format_pickup_window_in<Tz: TimeZone>(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match (start, end) {
        (Some(start), Some(end)) => format!(
            "{}-{}",
            start.with_timezone(tz).format("%H:%M"),
            end.with_timezone(tz).format("%H:%M")
        ),
        (Some(start), None) => start.with_timezone(tz).format("%H:%M").to_string(),
        _ => "--:--".to_string(),
    }
}

/// Format a pickup window in local time.
pub fn format_pickup_window(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
    format_pickup_window_in(start, end, &Local)
}
