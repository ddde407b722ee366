//! # Features
//!
//! Domain logic behind the bot's commands, independent of command parsing.

pub mod dice;
pub mod generation;
pub mod moderation;

pub use dice::{flip, RollRange};
pub use generation::{Generation, GenerationGateway, GenerationSession};
pub use moderation::{welcome_member, ModerationTarget, Poll};
