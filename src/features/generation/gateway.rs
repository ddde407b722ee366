//! Generation gateway: single-turn prompts, streamed aggregation, retry.

use futures_util::StreamExt;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{RwLock, Semaphore};

use super::backend::{GenerationBackend, GenerationRequest};
use super::error::{GenerationError, GenerationErrorKind};
use super::retry::Backoff;

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Clamp a temperature into the backend's accepted range. NaN falls back to the default.
pub fn clamp_temperature(temperature: f32) -> f32 {
    if temperature.is_nan() {
        DEFAULT_TEMPERATURE
    } else {
        temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
    }
}

/// Mutable gateway configuration. Requests snapshot it when they start, so a
/// setter never affects a generation already in flight.
#[derive(Debug, Clone)]
pub struct GenerationSession {
    api_key: String,
    model: String,
    temperature: f32,
    max_attempts: u32,
}

impl GenerationSession {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_attempts: u32,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::configuration("API key is empty"));
        }
        Ok(Self {
            api_key,
            model: model.into(),
            temperature: clamp_temperature(temperature),
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn request(&self, prompt: &str) -> GenerationRequest {
        GenerationRequest::new(prompt, self.model.clone(), self.temperature)
    }
}

/// Outcome of [`GenerationGateway::safe_generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    /// Every attempt failed with a backend API error
    Unavailable { attempts: u32 },
}

pub struct GenerationGateway {
    backend: Arc<dyn GenerationBackend>,
    session: RwLock<GenerationSession>,
    backoff: Backoff,
    permits: Arc<Semaphore>,
}

impl GenerationGateway {
    /// `max_concurrent` bounds how many backend exchanges run at once
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        session: GenerationSession,
        backoff: Backoff,
        max_concurrent: usize,
    ) -> Self {
        Self {
            backend,
            session: RwLock::new(session),
            backoff,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn set_model(&self, model: impl Into<String>) {
        let model = model.into();
        info!("Generation model set to {model}");
        self.session.write().await.model = model;
    }

    /// Returns the temperature actually stored
    pub async fn set_temperature(&self, temperature: f32) -> f32 {
        let clamped = clamp_temperature(temperature);
        self.session.write().await.temperature = clamped;
        info!("Generation temperature set to {clamped}");
        clamped
    }

    pub async fn set_api_key(&self, api_key: impl Into<String>) -> Result<(), GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::configuration("API key is empty"));
        }
        self.session.write().await.api_key = api_key;
        info!("Generation API key replaced");
        Ok(())
    }

    pub async fn session(&self) -> GenerationSession {
        self.session.read().await.clone()
    }

    /// Generate once. The backend exchange runs on a separate task; the caller
    /// only awaits its completion.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let (api_key, request) = self.snapshot(prompt).await;
        let backend = self.backend.clone();
        let permits = self.permits.clone();

        let handle = tokio::spawn(async move {
            run_once(backend.as_ref(), &permits, &api_key, &request).await
        });
        handle
            .await
            .map_err(|e| GenerationError::new(GenerationErrorKind::Worker, e.to_string()))?
    }

    /// Generate with retry on backend API errors.
    ///
    /// Up to `max_attempts` tries with a fixed delay between them. When every
    /// attempt fails with an API error the result is
    /// [`Generation::Unavailable`]; any other error is returned immediately.
    /// The whole retry loop, delays included, runs off the caller's task.
    pub async fn safe_generate(&self, prompt: &str) -> Result<Generation, GenerationError> {
        let (api_key, request) = self.snapshot(prompt).await;
        let max_attempts = self.session.read().await.max_attempts;
        let backend = self.backend.clone();
        let permits = self.permits.clone();
        let backoff = self.backoff.clone();

        let handle = tokio::spawn(async move {
            for attempt in 1..=max_attempts {
                match run_once(backend.as_ref(), &permits, &api_key, &request).await {
                    Ok(text) => return Ok(Generation::Text(text)),
                    Err(e) => {
                        let Some(code) = e.api_code() else {
                            return Err(e);
                        };
                        warn!(
                            "Generation attempt {attempt}/{max_attempts} failed - code: {code} ({})",
                            e.detail
                        );
                        if attempt < max_attempts {
                            info!("Retrying in {:?}...", backoff.delay);
                            backoff.wait().await;
                        }
                    }
                }
            }
            warn!("Generation unavailable after {max_attempts} attempts");
            Ok(Generation::Unavailable {
                attempts: max_attempts,
            })
        });
        handle
            .await
            .map_err(|e| GenerationError::new(GenerationErrorKind::Worker, e.to_string()))?
    }

    async fn snapshot(&self, prompt: &str) -> (String, GenerationRequest) {
        let session = self.session.read().await;
        (session.api_key.clone(), session.request(prompt))
    }
}

/// One backend exchange: open the stream and concatenate chunks in arrival order
async fn run_once(
    backend: &dyn GenerationBackend,
    permits: &Semaphore,
    api_key: &str,
    request: &GenerationRequest,
) -> Result<String, GenerationError> {
    let _permit = permits
        .acquire()
        .await
        .map_err(|e| GenerationError::new(GenerationErrorKind::Worker, e.to_string()))?;

    let start = Instant::now();
    debug!(
        "Generating with {} (prompt {} chars)",
        request.model(),
        request.prompt().len()
    );

    let mut stream = backend.stream(api_key, request).await?;
    let mut response = String::new();
    let mut chunks = 0usize;
    while let Some(chunk) = stream.next().await {
        response.push_str(&chunk?);
        chunks += 1;
    }

    debug!(
        "Generation finished in {:?} | {chunks} chunks | {} chars",
        start.elapsed(),
        response.len()
    );
    Ok(response)
}
