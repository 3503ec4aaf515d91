// Token Provider - OAuth2 access-token lifecycle management

pub mod config;
pub mod error;
pub mod provider;
pub mod refresh;
pub mod types;

pub use config::{GrantType, ProviderOptions};
pub use error::TokenError;
pub use provider::TokenProvider;
pub use types::TokenState;
