// Core layer - shared types and configuration
pub mod core;

// Features layer - generation, moderation, dice
pub mod features;

// Platform seam - outbound chat side effects
pub mod platform;

// Application layer
pub mod commands;

pub use core::{BotError, BotResult, Config, Settings};
