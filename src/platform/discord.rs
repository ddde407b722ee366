//! Serenity-backed [`ChatPlatform`]
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serenity::http::{Http, HttpError};
use serenity::model::channel::{AttachmentType, ReactionType};
use serenity::model::guild::Member;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId as DiscordUserId};
use serenity::model::Timestamp;
use serenity::utils::Colour;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{ChatPlatform, MemberProfile, MessageRef, PollEmbed, RoleInfo, UserId};
use crate::core::{BotError, BotResult};

/// Discord allows bulk-fetching at most this many messages at once
const MAX_FETCH: u64 = 100;

/// JSON error code Discord returns for a user outside the guild
const UNKNOWN_MEMBER_CODE: isize = 10007;

fn is_missing_member(error: &HttpError) -> bool {
    match error {
        HttpError::UnsuccessfulRequest(response) => {
            is_missing_member_response(response.status_code.as_u16(), response.error.code)
        }
        _ => false,
    }
}

/// Only a 404 or Unknown Member means "not here"; 403, 429 and 5xx are failures
fn is_missing_member_response(status: u16, code: isize) -> bool {
    status == 404 || code == UNKNOWN_MEMBER_CODE
}

/// Discord access for one channel, optionally inside a guild
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
    guild_id: Option<GuildId>,
    channel_id: ChannelId,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>, guild_id: Option<GuildId>, channel_id: ChannelId) -> Self {
        Self {
            http,
            guild_id,
            channel_id,
        }
    }

    fn guild(&self) -> BotResult<GuildId> {
        self.guild_id
            .ok_or_else(|| BotError::platform("This command can only be used in a server."))
    }

    async fn fetch_member(&self, user: UserId) -> BotResult<Option<Member>> {
        let guild = self.guild()?;
        match self.http.get_member(guild.0, user).await {
            Ok(member) => Ok(Some(member)),
            Err(serenity::Error::Http(e)) if is_missing_member(&e) => {
                debug!("Member {user} is not in guild {guild}: {e}");
                Ok(None)
            }
            Err(e) => Err(platform_err(e)),
        }
    }

    async fn edit_member<F>(&self, user: UserId, f: F) -> BotResult<()>
    where
        F: FnOnce(
            &mut serenity::builder::EditMember,
        ) -> &mut serenity::builder::EditMember,
    {
        self.guild()?
            .edit_member(&self.http, DiscordUserId(user), f)
            .await
            .map_err(platform_err)?;
        Ok(())
    }
}

fn platform_err(e: serenity::Error) -> BotError {
    BotError::PlatformAction(e.to_string())
}

fn to_utc(timestamp: Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0)
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn send_message(&self, text: &str) -> BotResult<MessageRef> {
        let message = self
            .channel_id
            .say(&self.http, text)
            .await
            .map_err(platform_err)?;
        Ok(message.id.0)
    }

    async fn send_transient(&self, text: &str, ttl: Duration) -> BotResult<()> {
        let message = self
            .channel_id
            .say(&self.http, text)
            .await
            .map_err(platform_err)?;

        let http = self.http.clone();
        let channel_id = self.channel_id;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Err(e) = channel_id.delete_message(&http, message.id).await {
                warn!("Failed to delete transient message {}: {e}", message.id);
            }
        });
        Ok(())
    }

    async fn send_file(&self, path: &Path, display_name: &str) -> BotResult<()> {
        let data = tokio::fs::read(path).await?;
        let attachment = AttachmentType::Bytes {
            data: Cow::Owned(data),
            filename: display_name.to_string(),
        };
        self.channel_id
            .send_files(&self.http, vec![attachment], |m| m)
            .await
            .map_err(platform_err)?;
        Ok(())
    }

    async fn send_embed(&self, embed: &PollEmbed) -> BotResult<MessageRef> {
        let message = self
            .channel_id
            .send_message(&self.http, |m| {
                m.embed(|e| {
                    e.title(&embed.title)
                        .description(&embed.description)
                        .colour(Colour::BLUE)
                        .footer(|f| f.text(&embed.footer))
                })
            })
            .await
            .map_err(platform_err)?;
        Ok(message.id.0)
    }

    async fn add_reaction(&self, message: MessageRef, emoji: &str) -> BotResult<()> {
        self.channel_id
            .create_reaction(
                &self.http,
                MessageId(message),
                ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(platform_err)
    }

    async fn member_profile(&self, user: UserId) -> BotResult<Option<MemberProfile>> {
        let Some(member) = self.fetch_member(user).await? else {
            return Ok(None);
        };

        let roles = self.guild_roles().await?;
        let top_role = roles
            .iter()
            .filter(|r| member.roles.contains(&RoleId(r.id)))
            .max_by_key(|r| r.position)
            .map(|r| r.name.clone())
            .or_else(|| Some("@everyone".to_string()));

        Ok(Some(MemberProfile {
            user_id: user,
            username: member.user.tag(),
            display_name: member.display_name().to_string(),
            nickname: member.nick.clone(),
            bot: member.user.bot,
            top_role,
            joined_at: member.joined_at.and_then(to_utc),
            created_at: to_utc(member.user.created_at()).unwrap_or_else(Utc::now),
        }))
    }

    async fn guild_roles(&self) -> BotResult<Vec<RoleInfo>> {
        let guild = self.guild()?;
        let roles = self
            .http
            .get_guild_roles(guild.0)
            .await
            .map_err(platform_err)?;
        Ok(roles
            .into_iter()
            .map(|r| RoleInfo {
                id: r.id.0,
                name: r.name,
                position: r.position,
            })
            .collect())
    }

    async fn add_role(&self, user: UserId, role: &RoleInfo) -> BotResult<()> {
        let mut member = self
            .fetch_member(user)
            .await?
            .ok_or_else(|| BotError::TargetNotFound("Member not found in this server.".into()))?;
        member
            .add_role(&self.http, RoleId(role.id))
            .await
            .map_err(platform_err)
    }

    async fn timeout_member(&self, user: UserId, until: DateTime<Utc>) -> BotResult<()> {
        let until = until.to_rfc3339();
        self.edit_member(user, |m| m.disable_communication_until(until))
            .await
    }

    async fn remove_timeout(&self, user: UserId) -> BotResult<()> {
        self.edit_member(user, |m| m.enable_communication()).await
    }

    async fn set_nickname(&self, user: UserId, nickname: &str) -> BotResult<()> {
        self.edit_member(user, |m| m.nickname(nickname)).await
    }

    async fn purge(&self, limit: u64) -> BotResult<usize> {
        let mut remaining = limit;
        let mut deleted = 0;
        while remaining > 0 {
            let batch = remaining.min(MAX_FETCH);
            let messages = self
                .channel_id
                .messages(&self.http, |b| b.limit(batch))
                .await
                .map_err(platform_err)?;
            if messages.is_empty() {
                break;
            }

            let ids: Vec<MessageId> = messages.iter().map(|m| m.id).collect();
            if ids.len() == 1 {
                self.channel_id
                    .delete_message(&self.http, ids[0])
                    .await
                    .map_err(platform_err)?;
            } else {
                self.channel_id
                    .delete_messages(&self.http, ids.iter())
                    .await
                    .map_err(platform_err)?;
            }

            deleted += ids.len();
            remaining -= ids.len() as u64;
            if (ids.len() as u64) < batch {
                break;
            }
        }
        Ok(deleted)
    }

    async fn set_slowmode(&self, seconds: u64) -> BotResult<()> {
        self.channel_id
            .edit(&self.http, |c| c.rate_limit_per_user(seconds))
            .await
            .map_err(platform_err)?;
        Ok(())
    }

    async fn latency(&self) -> BotResult<Duration> {
        let start = Instant::now();
        self.http.get_current_user().await.map_err(platform_err)?;
        Ok(start.elapsed())
    }
}
