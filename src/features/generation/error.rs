//! Error types for generation backend operations.

use thiserror::Error;

/// What went wrong while talking to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenerationErrorKind {
    /// The backend answered with an error response; carries its error code.
    /// These are the only errors retried by `safe_generate`.
    Api { code: String },
    /// Connection-level failure before or during the response
    Transport,
    /// Response body could not be understood
    Decode,
    /// The offloaded worker task panicked or was cancelled
    Worker,
    /// Missing or empty API key, unusable session settings
    Configuration,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationErrorKind::Api { code } => write!(f, "API error (code {code})"),
            GenerationErrorKind::Transport => write!(f, "transport error"),
            GenerationErrorKind::Decode => write!(f, "decode error"),
            GenerationErrorKind::Worker => write!(f, "worker error"),
            GenerationErrorKind::Configuration => write!(f, "configuration error"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {detail}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub detail: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn api(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Api { code: code.into() }, detail)
    }

    pub fn configuration(detail: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Configuration, detail)
    }

    /// Backend error code, if this is an API error
    pub fn api_code(&self) -> Option<&str> {
        match &self.kind {
            GenerationErrorKind::Api { code } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(GenerationErrorKind::Transport, e.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(GenerationErrorKind::Decode, e.to_string())
    }
}
