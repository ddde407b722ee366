//! Bot-wide error taxonomy
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Typed errors replacing string matching on handler failures

use thiserror::Error;

use crate::features::generation::GenerationError;

pub type BotResult<T> = std::result::Result<T, BotError>;

/// Every failure a command can produce.
///
/// The router decides what the invoking user sees from the variant alone:
/// user-facing variants are rendered verbatim, the rest are logged and
/// replaced with a generic message.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Backend(#[from] GenerationError),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    TargetNotFound(String),

    #[error("{0}")]
    PlatformAction(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command \"{0}\" is not found")]
    CommandNotFound(String),
}

impl BotError {
    /// Errors that are safe and useful to show to the user as-is
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            BotError::InvalidArgument(_)
                | BotError::PermissionDenied(_)
                | BotError::TargetNotFound(_)
                | BotError::PlatformAction(_)
                | BotError::CommandNotFound(_)
        )
    }

    /// Whether the feedback message should delete itself after a short delay
    pub fn is_transient(&self) -> bool {
        matches!(self, BotError::PlatformAction(_) | BotError::PermissionDenied(_))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        BotError::InvalidArgument(message.into())
    }

    pub fn platform(message: impl Into<String>) -> Self {
        BotError::PlatformAction(message.into())
    }
}
