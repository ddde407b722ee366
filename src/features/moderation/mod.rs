//! # Feature: Moderation Actions
//!
//! Member timeouts, role grants, nicknames, reaction polls and the welcome
//! flow for new members. Every action goes through [`ChatPlatform`] so the
//! same code runs against Discord and the test double.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Missing roles reported as errors instead of silently skipped
//! - 1.0.0: Initial release
//!
//! [`ChatPlatform`]: crate::platform::ChatPlatform

pub mod poll;
pub mod roles;
pub mod target;
pub mod welcome;

pub use poll::{Poll, MAX_OPTIONS, MIN_OPTIONS, NUMBER_EMOJIS};
pub use roles::{find_role, holds_role};
pub use target::{clamp_timeout, grant_role, parse_mention, ModerationTarget};
pub use welcome::welcome_member;
