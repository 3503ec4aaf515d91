// Token provider
// Manages token lifecycle: validity check, transparent refresh, observers

use chrono::Utc;
use reqwest::Client;

use crate::config::ProviderOptions;
use crate::error::{Result, TokenError};
use crate::refresh;
use crate::types::TokenState;

/// Well-known Google OAuth2 token endpoint, used by [`TokenProvider::google`]
const GOOGLE_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";

/// Observer invoked with the new token state after each successful refresh
type NewTokenHandler = Box<dyn Fn(&TokenState) + Send + Sync>;

/// OAuth2 access-token provider.
///
/// Holds the grant configuration and the current token state, and hands out
/// a valid access token on demand, refreshing it against the token endpoint
/// when expired.
///
/// [`get_token`](Self::get_token) takes `&mut self`: each instance has at
/// most one refresh in flight, with no internal locking. Callers sharing a
/// provider across tasks wrap it in their own synchronization.
pub struct TokenProvider {
    url: String,
    options: ProviderOptions,
    current: Option<TokenState>,
    client: Client,
    handlers: Vec<NewTokenHandler>,
}

impl TokenProvider {
    /// Create a provider for the given token endpoint.
    ///
    /// Fails with [`TokenError::Config`] when `url` or `options.client_id`
    /// is empty. If `options` carries a seed `access_token`, the provider
    /// starts from that token; a seed `expires_in` recomputes the absolute
    /// expiry from the current time.
    pub fn new(url: impl Into<String>, options: ProviderOptions) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(TokenError::Config("url"));
        }
        if options.client_id.is_empty() {
            return Err(TokenError::Config("client_id"));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let current = options.access_token.as_ref().map(|access_token| {
            let mut state = TokenState {
                access_token: access_token.clone(),
                expires_in: options.expires_in,
                refresh_token: options.refresh_token.clone(),
                expires_in_date: options.expires_in_date,
                extra: Default::default(),
            };
            // A seeded expires_in always wins over a seeded expires_in_date
            if state.expires_in.is_some() {
                state.stamp_expiry(Utc::now());
            }
            state
        });

        Ok(Self {
            url,
            options,
            current,
            client,
            handlers: Vec::new(),
        })
    }

    /// Create a provider bound to the Google OAuth2 token endpoint
    pub fn google(options: ProviderOptions) -> Result<Self> {
        Self::new(GOOGLE_TOKEN_URL, options)
    }

    /// Register an observer called synchronously with the new token state
    /// after every successful refresh
    pub fn on_new_token<F>(&mut self, handler: F)
    where
        F: Fn(&TokenState) + Send + Sync + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// The token endpoint URL this provider refreshes against
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The current token state, if one has been fetched or seeded
    pub fn current_token(&self) -> Option<&TokenState> {
        self.current.as_ref()
    }

    /// Return a valid access token and the current refresh token.
    ///
    /// If the current token's expiry is strictly in the future it is
    /// returned as-is, with no network call. Otherwise (including a token
    /// with no known expiry) a refresh exchange runs first; on success the
    /// stored state is replaced, the configured `refresh_token` is rotated
    /// to the server's new value, and registered observers fire.
    ///
    /// On any refresh failure the stored state is left untouched.
    pub async fn get_token(&mut self) -> Result<(String, Option<String>)> {
        if let Some(ref current) = self.current {
            if current.is_valid_at(Utc::now()) {
                return Ok((
                    current.access_token.clone(),
                    current.refresh_token.clone(),
                ));
            }
        }

        let token = refresh::exchange(&self.client, &self.url, &self.options).await?;

        // Rotate the stored refresh token so subsequent exchanges use it
        if let Some(ref new_refresh_token) = token.refresh_token {
            self.options.refresh_token = Some(new_refresh_token.clone());
        }

        let result = (token.access_token.clone(), token.refresh_token.clone());
        self.current = Some(token);

        if let Some(ref token) = self.current {
            for handler in &self.handlers {
                handler(token);
            }
        }

        Ok(result)
    }
}
