//! # Chat Platform Seam
//!
//! The outbound side effects commands may perform, scoped to the guild and
//! channel a command was invoked in. [`discord::DiscordPlatform`] is the
//! serenity-backed implementation.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod discord;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;

use crate::core::BotResult;

pub type UserId = u64;
pub type MessageRef = u64;

pub use discord::DiscordPlatform;

/// A guild role, as needed for name-based lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: u64,
    pub name: String,
    pub position: i64,
}

/// Public profile of a guild member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberProfile {
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub nickname: Option<String>,
    pub bot: bool,
    pub top_role: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Rich message used for polls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollEmbed {
    pub title: String,
    pub description: String,
    pub footer: String,
}

/// Render a user mention
pub fn mention(user: UserId) -> String {
    format!("<@{user}>")
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_message(&self, text: &str) -> BotResult<MessageRef>;

    /// Send a message that deletes itself after `ttl`
    async fn send_transient(&self, text: &str, ttl: Duration) -> BotResult<()>;

    /// Upload the file at `path`, shown to users as `display_name`
    async fn send_file(&self, path: &Path, display_name: &str) -> BotResult<()>;

    async fn send_embed(&self, embed: &PollEmbed) -> BotResult<MessageRef>;

    async fn add_reaction(&self, message: MessageRef, emoji: &str) -> BotResult<()>;

    /// `Ok(None)` when the user is not a member of this guild
    async fn member_profile(&self, user: UserId) -> BotResult<Option<MemberProfile>>;

    async fn guild_roles(&self) -> BotResult<Vec<RoleInfo>>;

    async fn add_role(&self, user: UserId, role: &RoleInfo) -> BotResult<()>;

    async fn timeout_member(&self, user: UserId, until: DateTime<Utc>) -> BotResult<()>;

    async fn remove_timeout(&self, user: UserId) -> BotResult<()>;

    async fn set_nickname(&self, user: UserId, nickname: &str) -> BotResult<()>;

    /// Delete up to `limit` of the most recent messages, returning how many went
    async fn purge(&self, limit: u64) -> BotResult<usize>;

    async fn set_slowmode(&self, seconds: u64) -> BotResult<()>;

    /// Round-trip time to the platform API
    async fn latency(&self) -> BotResult<Duration>;
}
