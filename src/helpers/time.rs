use chrono::{DateTime, TimeDelta, Utc};

use crate::error::UpstreamError;

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_i64() -> i64 {
    now_utc().timestamp()
}

/// Whole days from `now` until `expire_time`, floored.
///
/// A partial day never counts: a token expiring in 23 hours reports `0`,
/// one that expired an hour ago reports `-1`. Negative values mean the
/// credential has already expired.
pub fn days_until(expire_time: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let delta = expire_time - now;
    let days = delta.num_days();
    // num_days truncates toward zero
    if delta < TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}

/// Parse an upstream RFC 3339 timestamp (e.g. `2024-01-15T00:00:00.000Z`)
/// and normalize it to UTC.
pub fn parse_expire_time(raw: &str) -> Result<DateTime<Utc>, UpstreamError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| UpstreamError::Decode(format!("invalid expireTime '{}': {}", raw, e)))
}
