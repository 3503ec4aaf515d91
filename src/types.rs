// Token state types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token state held by the provider, and the shape of a successful
/// token-endpoint response body.
///
/// `expires_in_date` is never on the wire; it is computed as issuance time
/// plus `expires_in` seconds. Provider-specific response fields beyond the
/// standard ones are preserved verbatim in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,

    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub expires_in_date: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenState {
    /// Stamp the absolute expiry from `expires_in`, relative to `issued_at`.
    /// A state without `expires_in` keeps no expiry and is treated as expired.
    /// An `expires_in` beyond chrono's range clamps to the far future rather
    /// than wrapping.
    pub fn stamp_expiry(&mut self, issued_at: DateTime<Utc>) {
        self.expires_in_date = self.expires_in.map(|secs| {
            i64::try_from(secs)
                .ok()
                .and_then(Duration::try_seconds)
                .and_then(|ttl| issued_at.checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });
    }

    /// Whether the token is still valid at `now` (expiry strictly in the future)
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_in_date {
            // No expiry info, assume expired
            None => false,
            Some(exp) => exp > now,
        }
    }
}
