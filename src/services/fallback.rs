use futures::stream::{self, StreamExt};
use std::time::Duration;

use super::{ChunkStream, ContentBackend};
use crate::error::GenerateError;
use crate::fallback::generate_for;
use crate::types::{GenerationMode, GenerationRequest};

/// Serves template text word by word so it renders like a live stream.
#[derive(Debug, Clone)]
pub struct FallbackBackend {
    delay: Duration,
}

impl FallbackBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

/// One chunk per space-separated word, each followed by a single space.
/// Newlines stay inside the words they are attached to.
pub fn word_chunks(text: &str) -> Vec<String> {
    text.split(' ').map(|word| format!("{word} ")).collect()
}

#[async_trait::async_trait]
impl ContentBackend for FallbackBackend {
    fn mode(&self) -> GenerationMode {
        GenerationMode::Fallback
    }

    async fn open(&self, request: &GenerationRequest) -> Result<ChunkStream, GenerateError> {
        let chunks = word_chunks(&generate_for(request));
        log::debug!(
            "Streaming {} fallback chunks for {} request",
            chunks.len(),
            request.content_type
        );

        let delay = self.delay;
        let paced = stream::iter(chunks.into_iter().enumerate()).then(move |(i, chunk)| async move {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, GenerateError>(chunk)
        });
        Ok(paced.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::generate;
    use crate::types::{ContentType, Length};

    fn request(content_type: ContentType, length: Length) -> GenerationRequest {
        GenerationRequest {
            content_type,
            prompt: "electric bikes".to_string(),
            tone: "humorous".to_string(),
            length,
        }
    }

    #[test]
    fn test_word_chunks_rebuild_text() {
        let text = "Hello there,\n\nworld of  streams";
        let chunks = word_chunks(text);
        assert!(chunks.iter().all(|c| c.ends_with(' ')));
        assert_eq!(chunks.concat(), format!("{text} "));
    }

    #[tokio::test]
    async fn test_stream_reconstructs_generator_output() {
        let backend = FallbackBackend::new(Duration::ZERO);
        for content_type in ContentType::ALL {
            for length in Length::ALL {
                let req = request(content_type, length);
                let chunks: Vec<String> = backend
                    .open(&req)
                    .await
                    .unwrap()
                    .map(|c| c.unwrap())
                    .collect()
                    .await;
                let expected = generate(content_type.as_str(), &req.prompt, &req.tone, length);
                assert_eq!(chunks.concat(), format!("{expected} "));
                assert!(chunks.len() > 1);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunks_are_paced() {
        let backend = FallbackBackend::new(Duration::from_millis(20));
        let start = tokio::time::Instant::now();
        let count = backend
            .open(&request(ContentType::Social, Length::Short))
            .await
            .unwrap()
            .count()
            .await;
        assert!(start.elapsed() >= Duration::from_millis(20) * (count as u32 - 1));
    }

    #[test]
    fn test_reports_fallback_mode() {
        assert_eq!(FallbackBackend::new(Duration::ZERO).mode(), GenerationMode::Fallback);
    }
}
