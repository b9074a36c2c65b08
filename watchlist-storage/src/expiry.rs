//! Parsing of watch expiry strings.
//!
//! Accepted forms:
//! - `infinite`, `infinity`, `indefinite`, `never`: a permanent watch
//! - RFC 3339 (`2030-01-01T00:00:00Z`)
//! - 14-digit compact timestamps (`20300101000000`), read as UTC
//! - relative periods (`1 week`, `3 months`, `12 hours`)

use chrono::{Duration, Months, NaiveDateTime, Utc};
use watchlist_core::{Timestamp, WatchlistError, WatchlistResult};

const INFINITE_KEYWORDS: [&str; 4] = ["infinite", "infinity", "indefinite", "never"];

/// Result of parsing an expiry string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedExpiry {
    /// Watch never lapses.
    Infinite,
    /// Watch lapses at the given time.
    At(Timestamp),
}

impl ParsedExpiry {
    pub fn as_timestamp(self) -> Option<Timestamp> {
        match self {
            ParsedExpiry::Infinite => None,
            ParsedExpiry::At(ts) => Some(ts),
        }
    }
}

/// Parse `value` relative to `now`. Expiries at or before `now` are rejected.
pub fn parse_expiry(value: &str, now: Timestamp) -> WatchlistResult<ParsedExpiry> {
    let normalized = value.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(invalid(value, "expiry is empty"));
    }
    if INFINITE_KEYWORDS.contains(&normalized.as_str()) {
        return Ok(ParsedExpiry::Infinite);
    }

    let at = if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value.trim()) {
        dt.with_timezone(&Utc)
    } else if normalized.len() == 14 && normalized.bytes().all(|b| b.is_ascii_digit()) {
        NaiveDateTime::parse_from_str(&normalized, "%Y%m%d%H%M%S")
            .map_err(|e| invalid(value, &e.to_string()))?
            .and_utc()
    } else {
        parse_relative(&normalized, now).ok_or_else(|| invalid(value, "unrecognized format"))?
    };

    if at <= now {
        return Err(invalid(value, "expiry is in the past"));
    }
    Ok(ParsedExpiry::At(at))
}

fn parse_relative(value: &str, now: Timestamp) -> Option<Timestamp> {
    let mut parts = value.split_whitespace();
    let amount: u32 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    if parts.next().is_some() || amount == 0 {
        return None;
    }

    match unit.trim_end_matches('s') {
        "hour" => now.checked_add_signed(Duration::try_hours(i64::from(amount))?),
        "day" => now.checked_add_signed(Duration::try_days(i64::from(amount))?),
        "week" => now.checked_add_signed(Duration::try_weeks(i64::from(amount))?),
        "month" => now.checked_add_months(Months::new(amount)),
        "year" => now.checked_add_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}

fn invalid(value: &str, reason: &str) -> WatchlistError {
    WatchlistError::InvalidExpiry {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
