//! Token Inspector: reads the access token's payload without verifying it.
//!
//! Signature checks are the server's job. Everything here only feeds local
//! scheduling decisions, and anything unreadable counts as expired.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use dash_core::SessionIdentity;
use serde_json::{Map, Value};

/// Refresh when the access token expires within this many seconds.
pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 300;

/// Claims decoded from an access token. Recomputed on every call, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAccessClaims {
    /// `id` claim, else `sub`.
    pub subject_id: Option<String>,
    /// `exp` claim, epoch seconds.
    pub expires_at: i64,
    /// Full payload, including the fields above.
    pub raw: Map<String, Value>,
}

impl DecodedAccessClaims {
    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    #[must_use]
    pub fn identity(&self) -> Option<SessionIdentity> {
        Some(SessionIdentity {
            subject_id: self.subject_id.clone()?,
            expires_at: self.expires_at,
        })
    }
}

/// Decode the payload segment of a three-segment token.
///
/// Returns `None` for any malformed input: wrong segment count, bad base64,
/// non-object JSON, or a missing/non-numeric `exp`.
#[must_use]
pub fn decode(token: &str) -> Option<DecodedAccessClaims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = decode_segment(payload)?;
    let Value::Object(raw) = serde_json::from_slice::<Value>(&bytes).ok()? else {
        return None;
    };

    let expires_at = raw.get("exp").and_then(epoch_seconds)?;
    let subject_id = ["id", "sub"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    Some(DecodedAccessClaims {
        subject_id,
        expires_at,
        raw,
    })
}

/// `exp - now` in seconds; negative once expired. `None` when the token is
/// undecodable or the difference does not fit in an `i64`.
#[must_use]
pub fn seconds_until_expiry(token: &str, now: DateTime<Utc>) -> Option<i64> {
    decode(token).and_then(|claims| claims.expires_at.checked_sub(now.timestamp()))
}

/// True when the token is undecodable or expires within `threshold_secs`.
#[must_use]
pub fn should_refresh(token: &str, threshold_secs: i64, now: DateTime<Utc>) -> bool {
    seconds_until_expiry(token, now).is_none_or(|remaining| remaining <= threshold_secs)
}

// Issuers disagree on alphabet and padding.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
}
