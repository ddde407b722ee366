//! # Feature: Generation Gateway
//!
//! Relays prompts to the Gemini text-generation API. Each call is a single
//! stateless turn; streamed chunks are concatenated in arrival order. Backend
//! exchanges run on their own tasks behind a concurrency bound, and API
//! errors are retried with a fixed delay before degrading to "unavailable".
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod backend;
pub mod error;
pub mod gateway;
pub mod gemini;
pub mod retry;
pub mod secrets;

pub use backend::{ChunkStream, GenerationBackend, GenerationRequest};
pub use error::{GenerationError, GenerationErrorKind};
pub use gateway::{
    clamp_temperature, Generation, GenerationGateway, GenerationSession, MAX_TEMPERATURE,
    MIN_TEMPERATURE,
};
pub use gemini::{GeminiBackend, KNOWN_MODELS};
pub use retry::{Backoff, Sleeper, TokioSleeper};
pub use secrets::ApiKeySource;
