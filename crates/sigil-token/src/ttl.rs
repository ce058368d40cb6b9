//! Token lifetimes given as human-readable durations ("10m", "12h", "30days").

use crate::error::{TokenError, TokenResult};
use chrono::Utc;
use std::time::Duration;

/// Parses a duration with `humantime`.
pub fn parse_duration(value: &str) -> TokenResult<Duration> {
    humantime::parse_duration(value.trim()).map_err(|e| TokenError::InvalidDuration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Expiry (Unix seconds) of a token issued now for `timeout`, capped by `max_ttl`.
pub fn expiry_after(timeout: &str, max_ttl: &str) -> TokenResult<i64> {
    let lifetime = parse_duration(timeout)?;
    if lifetime > parse_duration(max_ttl)? {
        return Err(TokenError::TimeoutExceedsMaxTtl {
            timeout: timeout.to_string(),
            max_ttl: max_ttl.to_string(),
        });
    }
    let secs = i64::try_from(lifetime.as_secs()).map_err(|_| TokenError::InvalidDuration {
        value: timeout.to_string(),
        reason: "too long".to_string(),
    })?;
    Ok(Utc::now().timestamp().saturating_add(secs))
}
