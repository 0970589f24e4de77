//! High-level client implementation

use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;
use weft_core::{Error, Message, TurnRequest};
use weft_stream::{create_headers, HttpClient, MutationStream, ReqwestClient};

use crate::config::ClientConfig;
use crate::turn::{TurnStream, TurnUpdate};

/// High-level client for streamed conversational turns
///
/// # Examples
///
/// ```no_run
/// use futures::StreamExt;
/// use weft_client::{ChatClient, ClientConfig, TurnUpdate};
/// use weft_core::TurnRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ChatClient::new(ClientConfig::new("https://backend.example"))?;
///
/// let mut turn = client.stream_turn(TurnRequest::new("Hello!")).await?;
/// while let Some(update) = turn.next().await {
///     match update {
///         TurnUpdate::Snapshot(snapshot) => print!("\r{}", snapshot.content),
///         TurnUpdate::Completed(message) => println!("\n{}", message.content),
///         TurnUpdate::Failed { partial, error } => {
///             println!("\n{} [interrupted: {}]", partial.content, error);
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct ChatClient {
    http: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl ChatClient {
    /// Create a client with the default HTTP implementation
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            http: Arc::new(ReqwestClient::new()?),
            config,
        })
    }

    /// Create a client with a custom HTTP implementation
    pub fn with_http_client(http: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        Self { http, config }
    }

    /// Issue a turn request and stream its aggregation.
    ///
    /// Each request owns an independent accumulator; starting a new turn
    /// never reuses or resets another turn's state. Dropping the returned
    /// stream cancels the turn.
    pub async fn stream_turn(&self, request: TurnRequest) -> Result<TurnStream, Error> {
        let url = self.config.stream_url();
        debug!(url = url.as_str(), "starting turn");

        let headers = create_headers(self.config.api_key.as_deref())?;
        let body = serde_json::to_value(&request)?;
        let bytes = self.http.post_stream(&url, headers, body).await?;

        Ok(TurnStream::new(MutationStream::new(bytes)))
    }

    /// Issue a turn request and wait for the finalized message.
    ///
    /// Convenience over [`stream_turn`](Self::stream_turn) for callers that
    /// do not render progressively. A transport failure becomes an error;
    /// use `stream_turn` to also receive the partial message in that case.
    pub async fn send_turn(&self, request: TurnRequest) -> Result<Message, Error> {
        let mut turn = self.stream_turn(request).await?;
        while let Some(update) = turn.next().await {
            match update {
                TurnUpdate::Snapshot(_) => {}
                TurnUpdate::Completed(message) => return Ok(message),
                TurnUpdate::Failed { error, .. } => return Err(error),
            }
        }
        Err(Error::Response {
            message: "stream ended without a finalized message".into(),
        })
    }
}
