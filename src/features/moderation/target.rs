//! Member targets for moderation commands, resolved from mention text.

use chrono::{Duration as ChronoDuration, Utc};
use log::info;
use regex::Regex;
use std::sync::OnceLock;

use crate::core::{BotError, BotResult};
use crate::platform::{mention, ChatPlatform, MemberProfile, UserId};

use super::roles::find_role;

/// Discord's nickname length limit
pub const MAX_NICKNAME_CHARS: usize = 32;

fn mention_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(?:<@!?(\d+)>|(\d+))$").ok())
        .as_ref()
}

/// Extract a user id from `<@id>`, `<@!id>` or a bare id
pub fn parse_mention(raw: &str) -> Option<UserId> {
    let caps = mention_pattern()?.captures(raw.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// Clamp a requested timeout into `[1, max_secs]`
pub fn clamp_timeout(seconds: i64, max_secs: u64) -> u64 {
    let max = i64::try_from(max_secs).unwrap_or(i64::MAX).max(1);
    seconds.clamp(1, max) as u64
}

/// A guild member a moderation action applies to
#[derive(Debug, Clone)]
pub struct ModerationTarget {
    pub member: MemberProfile,
}

impl ModerationTarget {
    /// Resolve mention text to a member of the current guild
    pub async fn resolve(platform: &dyn ChatPlatform, raw: &str) -> BotResult<Self> {
        let user = parse_mention(raw).ok_or_else(|| BotError::invalid("Invalid mention format."))?;
        let member = platform
            .member_profile(user)
            .await?
            .ok_or_else(|| BotError::TargetNotFound("Member not found in this server.".into()))?;
        Ok(Self { member })
    }

    pub fn user_id(&self) -> UserId {
        self.member.user_id
    }

    pub fn mention(&self) -> String {
        mention(self.member.user_id)
    }

    /// Time the member out; returns the effective duration in seconds
    pub async fn apply_timeout(
        &self,
        platform: &dyn ChatPlatform,
        seconds: i64,
        max_secs: u64,
    ) -> BotResult<u64> {
        let effective = clamp_timeout(seconds, max_secs);
        let until = i64::try_from(effective)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or_else(|| BotError::invalid(format!("Timeout of {effective} seconds is too long.")))?;
        platform
            .timeout_member(self.user_id(), until)
            .await
            .map_err(|e| BotError::platform(format!("❌ Failed to timeout member: {e}")))?;
        info!("Timed out {} for {effective}s", self.member.username);
        Ok(effective)
    }

    pub async fn remove_timeout(&self, platform: &dyn ChatPlatform) -> BotResult<()> {
        platform
            .remove_timeout(self.user_id())
            .await
            .map_err(|e| BotError::platform(format!("❌ Failed to remove timeout: {e}")))?;
        info!("Removed timeout for {}", self.member.username);
        Ok(())
    }

    pub async fn set_nickname(&self, platform: &dyn ChatPlatform, nickname: &str) -> BotResult<()> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(BotError::invalid("Nickname cannot be empty."));
        }
        if nickname.chars().count() > MAX_NICKNAME_CHARS {
            return Err(BotError::invalid(format!(
                "Nickname must be at most {MAX_NICKNAME_CHARS} characters."
            )));
        }
        platform
            .set_nickname(self.user_id(), nickname)
            .await
            .map_err(|e| BotError::platform(format!("❌ Failed to change nickname: {e}")))
    }

    pub async fn grant_role(&self, platform: &dyn ChatPlatform, role_name: &str) -> BotResult<()> {
        grant_role(platform, self.user_id(), role_name).await?;
        info!("Granted role {role_name} to {}", self.member.username);
        Ok(())
    }
}

/// Grant a role by exact name. A missing role is an error, never a no-op.
pub async fn grant_role(platform: &dyn ChatPlatform, user: UserId, role_name: &str) -> BotResult<()> {
    let roles = platform.guild_roles().await?;
    let role = find_role(&roles, role_name)
        .ok_or_else(|| BotError::TargetNotFound(format!("Role `{role_name}` not found.")))?;
    platform
        .add_role(user, role)
        .await
        .map_err(|e| BotError::platform(format!("Failed to add role: {e}")))
}
