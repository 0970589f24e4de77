//! HTTP client abstraction and utilities

use crate::error;
use bytes::Bytes;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::pin::Pin;
use weft_core::Error;

/// Type alias for response byte streams
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// HTTP client abstraction
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a streaming POST request and return the response body as bytes
    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<ResponseStream, Error>;
}

/// Default HTTP client implementation using reqwest
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(error::transport_error)?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<ResponseStream, Error> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(error::transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport {
                message: format!("HTTP {}: {}", status, text),
                source: None,
            });
        }

        Ok(Box::pin(response.bytes_stream()))
    }
}

/// Helper to create common headers
pub fn create_headers(api_key: Option<&str>) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();

    if let Some(api_key) = api_key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| Error::Configuration(format!("Invalid API key: {}", e)))?,
        );
    }

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_headers_with_api_key() {
        let headers = create_headers(Some("secret")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer secret");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_create_headers_without_api_key() {
        let headers = create_headers(None).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_create_headers_rejects_invalid_key() {
        assert!(create_headers(Some("bad\nkey")).is_err());
    }
}
