//! Client construction options.

use std::fmt;
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::codec::JsonCodec;
use crate::http::Transport;

/// Environment variable holding a pre-existing session token.
pub const TOKEN_ENV: &str = "TODOIST_TOKEN";
/// Environment variable overriding the service root URL.
pub const BASE_URL_ENV: &str = "TODOIST_BASE_URL";

/// Settings forwarded to the default transport when none is injected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// Everything `Client::new` accepts. Construction never touches the network.
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub transport: Option<Box<dyn Transport + Send>>,
    pub transport_options: TransportOptions,
    pub codec: Option<Box<dyn JsonCodec + Send>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            transport: None,
            transport_options: TransportOptions::default(),
            codec: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `TODOIST_TOKEN` and `TODOIST_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.is_empty()) {
            config.token = Some(token);
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            config.base_url = url;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + Send + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn with_transport_options(mut self, options: TransportOptions) -> Self {
        self.transport_options = options;
        self
    }

    pub fn with_codec(mut self, codec: impl JsonCodec + Send + 'static) -> Self {
        self.codec = Some(Box::new(codec));
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("transport", &self.transport.as_ref().map(|_| "<custom>"))
            .field("transport_options", &self.transport_options)
            .field("codec", &self.codec.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_service() {
        let config = ClientConfig::new();
        assert_eq!(config.base_url, "https://todoist.com");
        assert!(config.token.is_none());
        assert!(config.transport.is_none());
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = ClientConfig::from_lookup(|key| match key {
            TOKEN_ENV => Some("tok".to_string()),
            BASE_URL_ENV => Some("http://127.0.0.1:3000".to_string()),
            _ => None,
        });
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn empty_variables_are_ignored() {
        let config = ClientConfig::from_lookup(|_| Some(String::new()));
        assert!(config.token.is_none());
        assert_eq!(config.base_url, "https://todoist.com");
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig::new().with_token("secret-token");
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("<redacted>"));
    }
}
