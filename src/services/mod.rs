pub mod fallback;
pub mod openai;

use futures::stream::BoxStream;

use crate::error::GenerateError;
use crate::types::{GenerationMode, GenerationRequest};

/// Text fragments in emission order. An `Err` item ends the stream.
pub type ChunkStream = BoxStream<'static, Result<String, GenerateError>>;

/// A source of generated text. The server holds exactly one, chosen at
/// startup, and opens a fresh stream per request.
#[async_trait::async_trait]
pub trait ContentBackend: Send + Sync {
    fn mode(&self) -> GenerationMode;

    /// Starts generation. Errors returned here happen before any byte is
    /// sent to the client.
    async fn open(&self, request: &GenerationRequest) -> Result<ChunkStream, GenerateError>;
}

pub type SharedBackend = std::sync::Arc<dyn ContentBackend>;
