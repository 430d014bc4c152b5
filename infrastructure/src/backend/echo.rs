//! Offline backend that streams the last user message back, word by word.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use relay_application::ports::generation_source::{
    ChunkStream, GenerationError, GenerationSource,
};
use relay_domain::{Role, Transcript};
use std::collections::VecDeque;
use std::time::Duration;

pub struct EchoSource {
    delay: Duration,
}

impl EchoSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

fn frame(text: &str) -> Vec<u8> {
    format!("data: {}\n\n", serde_json::json!({ "response": text })).into_bytes()
}

#[async_trait]
impl GenerationSource for EchoSource {
    async fn start(&self, transcript: &Transcript) -> Result<ChunkStream, GenerationError> {
        let reply = transcript
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(|turn| turn.content.clone())
            .unwrap_or_default();

        let mut frames: VecDeque<Vec<u8>> = reply
            .split_inclusive(char::is_whitespace)
            .map(frame)
            .collect();
        frames.push_back(b"data: [DONE]\n\n".to_vec());

        let delay = self.delay;
        Ok(stream::unfold(frames, move |mut frames| async move {
            let next = frames.pop_front()?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Some((Ok(next), frames))
        })
        .boxed())
    }

    fn name(&self) -> &str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_domain::{DecodedEvent, FrameDecoder, Turn};

    #[tokio::test]
    async fn test_echoes_last_user_turn() {
        let source = EchoSource::new(Duration::ZERO);
        let transcript = Transcript::from(vec![
            Turn::user("first"),
            Turn::assistant("first"),
            Turn::user("say  this back"),
        ]);

        let mut stream = source.start(&transcript).await.unwrap();
        let mut decoder = FrameDecoder::default();
        let mut events = Vec::new();
        while let Some(chunk) = stream.next().await {
            events.extend(decoder.push(&chunk.unwrap()).unwrap());
        }

        let text: String = events.iter().filter_map(DecodedEvent::text).collect();
        assert_eq!(text, "say  this back");
        assert_eq!(events.last(), Some(&DecodedEvent::Done));
    }

    #[tokio::test]
    async fn test_empty_conversation_only_finishes() {
        let source = EchoSource::new(Duration::ZERO);
        let chunks: Vec<_> = source.start(&Transcript::new()).await.unwrap().collect().await;
        assert_eq!(chunks.len(), 1);
    }
}
