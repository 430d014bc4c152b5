//! Streaming HTTP backend.
//!
//! POSTs the conversation as `{"messages": [...], "stream": true}` and hands
//! the response body to the relay chunk by chunk, untouched. Any endpoint
//! answering with `data: {"response": "..."}` lines works.

use async_trait::async_trait;
use futures::StreamExt;
use relay_application::ports::generation_source::{
    ChunkStream, GenerationError, GenerationSource,
};
use relay_domain::util::preview;
use relay_domain::{Transcript, Turn};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct GenerationRequest<'a> {
    messages: &'a [Turn],
    stream: bool,
}

pub struct HttpStreamSource {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpStreamSource {
    /// Build a source for `url`.
    ///
    /// Only connecting is bounded by `connect_timeout`; a slow stream is
    /// never cut off here, the client stops it instead.
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        connect_timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| GenerationError::Other(format!("invalid HTTP client setup: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

#[async_trait]
impl GenerationSource for HttpStreamSource {
    async fn start(&self, transcript: &Transcript) -> Result<ChunkStream, GenerationError> {
        let body = GenerationRequest {
            messages: transcript.turns(),
            stream: true,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: preview(&body, 200),
            });
        }

        debug!(url = %self.url, %status, "Generation stream opened");
        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| GenerationError::StreamError(e.to_string()))
            })
            .boxed())
    }

    fn name(&self) -> &str {
        "http"
    }
}
