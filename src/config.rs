// Provider configuration
// Grant credentials and optional seed token state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth2 grant type used for the token exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Resource-owner password credentials
    Password,

    /// Refresh-token exchange (default)
    #[default]
    RefreshToken,
}

impl GrantType {
    /// Wire value for the `grant_type` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Password => "password",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

/// Grant credentials and parameters for a [`TokenProvider`](crate::TokenProvider).
///
/// Immutable after construction except `refresh_token`, which the provider
/// rotates to the server's new value after each successful refresh.
///
/// `client_id` and `grant_type` are required; a configuration document
/// missing either fails to deserialize.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderOptions {
    pub client_id: String,
    pub grant_type: GrantType,
    pub client_secret: Option<String>,

    /// Required by the refresh-token grant
    pub refresh_token: Option<String>,

    // Password grant credentials
    pub username: Option<String>,
    pub password: Option<String>,

    // Seed values for an already-known token
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub expires_in_date: Option<DateTime<Utc>>,
}
