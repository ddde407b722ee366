//! # Core Module
//!
//! Configuration, error taxonomy, and response delivery shared by every command.
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Add error taxonomy, scratch files, and size-based delivery
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod response;
pub mod scratch;

// Re-export commonly used items
pub use config::{Config, DeliverySettings, DISCORD_MAX_TIMEOUT_SECS, GenerationSettings, Settings};
pub use error::{BotError, BotResult};
pub use response::{truncate_for_message, DeliveryPlan, DeliveryPolicy, MESSAGE_LIMIT};
pub use scratch::ScratchFile;
