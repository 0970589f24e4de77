//! Client configuration

/// Configuration for the chat client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend
    pub base_url: String,
    /// Optional bearer token
    pub api_key: Option<String>,
}

impl ClientConfig {
    /// Create a configuration for the given backend
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Read the bearer token from `WEFT_API_KEY`, if set
    pub fn with_api_key_from_env(mut self) -> Self {
        self.api_key = std::env::var("WEFT_API_KEY").ok();
        self
    }

    /// The endpoint a turn request is posted to
    pub fn stream_url(&self) -> String {
        format!("{}/chat/stream", self.base_url.trim_end_matches('/'))
    }
}
