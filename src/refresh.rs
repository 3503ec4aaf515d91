// Token refresh logic
// Builds the grant form and performs the token-endpoint exchange

use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};

use crate::config::{GrantType, ProviderOptions};
use crate::error::{Result, TokenError};
use crate::types::TokenState;

/// Build the form payload for the configured grant type.
/// Optional fields that are absent are omitted from the payload.
pub fn build_form(options: &ProviderOptions) -> Vec<(&'static str, &str)> {
    let mut form: Vec<(&'static str, &str)> = Vec::new();

    match options.grant_type {
        GrantType::Password => {
            if let Some(ref username) = options.username {
                form.push(("username", username));
            }
            if let Some(ref password) = options.password {
                form.push(("password", password));
            }
        }
        GrantType::RefreshToken => {
            if let Some(ref refresh_token) = options.refresh_token {
                form.push(("refresh_token", refresh_token));
            }
        }
    }

    form.push(("client_id", &options.client_id));
    if let Some(ref client_secret) = options.client_secret {
        form.push(("client_secret", client_secret));
    }
    form.push(("grant_type", options.grant_type.as_str()));

    form
}

/// Exchange the configured grant for a new token at the endpoint URL.
///
/// Non-200 responses become [`TokenError::AuthServer`]: the body's `error`
/// field when the endpoint answered with JSON, otherwise a generic message
/// carrying the raw body for diagnostics.
pub async fn exchange(client: &Client, url: &str, options: &ProviderOptions) -> Result<TokenState> {
    tracing::debug!(
        grant_type = options.grant_type.as_str(),
        url,
        "Refreshing access token..."
    );

    let form = build_form(options);

    let response = client.post(url).form(&form).send().await?;

    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);
    let body = response.text().await?;

    if status != StatusCode::OK {
        tracing::error!(status = %status, body = %body, "Token refresh rejected by endpoint");
        return Err(refresh_error(is_json, body)?);
    }

    let mut token: TokenState = serde_json::from_str(&body)?;
    token.stamp_expiry(Utc::now());

    match token.expires_in_date {
        Some(exp) => tracing::info!("Token refreshed, expires: {}", exp.to_rfc3339()),
        None => tracing::info!("Token refreshed, no expiry reported"),
    }

    Ok(token)
}

/// Derive the error for a non-200 response.
/// Returns `Err` only when a JSON error body fails to parse.
fn refresh_error(is_json: bool, body: String) -> Result<TokenError> {
    if is_json {
        let error_json: serde_json::Value = serde_json::from_str(&body)?;
        if let Some(message) = error_json.get("error").and_then(|v| v.as_str()) {
            return Ok(TokenError::AuthServer {
                message: message.to_string(),
                response_body: None,
            });
        }
    }

    Ok(TokenError::AuthServer {
        message: "error refreshing token".to_string(),
        response_body: Some(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrantType;

    fn refresh_options() -> ProviderOptions {
        ProviderOptions {
            client_id: "client".to_string(),
            grant_type: GrantType::RefreshToken,
            client_secret: Some("secret".to_string()),
            refresh_token: Some("rt-1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_refresh_grant_form() {
        let options = refresh_options();
        let form = build_form(&options);
        assert_eq!(
            form,
            vec![
                ("refresh_token", "rt-1"),
                ("client_id", "client"),
                ("client_secret", "secret"),
                ("grant_type", "refresh_token"),
            ]
        );
    }

    #[test]
    fn test_password_grant_form_omits_refresh_token() {
        let options = ProviderOptions {
            client_id: "client".to_string(),
            grant_type: GrantType::Password,
            client_secret: Some("secret".to_string()),
            username: Some("alice".to_string()),
            password: Some("hunter2".to_string()),
            // A stale refresh token must not leak into the password payload
            refresh_token: Some("rt-1".to_string()),
            ..Default::default()
        };

        let form = build_form(&options);
        assert_eq!(
            form,
            vec![
                ("username", "alice"),
                ("password", "hunter2"),
                ("client_id", "client"),
                ("client_secret", "secret"),
                ("grant_type", "password"),
            ]
        );
    }

    #[test]
    fn test_form_omits_absent_client_secret() {
        let mut options = refresh_options();
        options.client_secret = None;

        let form = build_form(&options);
        assert!(form.iter().all(|(k, _)| *k != "client_secret"));
    }

    #[test]
    fn test_refresh_error_json_body() {
        let err = refresh_error(true, r#"{"error":"invalid_grant"}"#.to_string()).unwrap();
        match err {
            TokenError::AuthServer {
                message,
                response_body,
            } => {
                assert_eq!(message, "invalid_grant");
                assert!(response_body.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_refresh_error_opaque_body() {
        let err = refresh_error(false, "internal error".to_string()).unwrap();
        match err {
            TokenError::AuthServer {
                message,
                response_body,
            } => {
                assert_eq!(message, "error refreshing token");
                assert_eq!(response_body.as_deref(), Some("internal error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_refresh_error_json_without_error_field() {
        let err = refresh_error(true, r#"{"detail":"nope"}"#.to_string()).unwrap();
        match err {
            TokenError::AuthServer {
                message,
                response_body,
            } => {
                assert_eq!(message, "error refreshing token");
                assert_eq!(response_body.as_deref(), Some(r#"{"detail":"nope"}"#));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_refresh_error_unparseable_json_body() {
        let err = refresh_error(true, "not json".to_string());
        assert!(matches!(err, Err(TokenError::MalformedResponse(_))));
    }
}
