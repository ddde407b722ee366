//! Backend abstraction: send one prompt, receive a stream of text chunks.

use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

use super::error::GenerationError;

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// A single-turn generation request, snapshotted from the session at call time
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    model: String,
    temperature: f32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Open a streaming generation. Errors before the first chunk are returned
    /// directly; errors mid-stream arrive as stream items.
    async fn stream(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<ChunkStream, GenerationError>;
}
