//! Utility command handlers
//!
//! Handles: profile, roll, flip, ping, version, help
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Prefix commands; profile, roll and flip added
//! - 1.0.0: Extracted from command_handler.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::commands::context::{CommandContext, Invocation};
use crate::commands::handler::{CommandSpec, Permission, PrefixCommandHandler};
use crate::commands::parser::Args;
use crate::core::{truncate_for_message, BotError, BotResult, Settings};
use crate::features::dice::{flip, RollRange};
use crate::features::moderation::ModerationTarget;
use crate::platform::{mention, MemberProfile};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static COMMANDS: [CommandSpec; 6] = [
    CommandSpec {
        name: "profile",
        aliases: &["whois", "user"],
        permission: Permission::Everyone,
        usage: "profile [@member]",
        description: "Show information about a member",
    },
    CommandSpec {
        name: "roll",
        aliases: &["rng", "dice"],
        permission: Permission::Everyone,
        usage: "roll [low] [high]",
        description: "Roll a random number (default 1-6)",
    },
    CommandSpec {
        name: "flip",
        aliases: &["coinflip", "coin"],
        permission: Permission::Everyone,
        usage: "flip",
        description: "Flip a coin",
    },
    CommandSpec {
        name: "ping",
        aliases: &[],
        permission: Permission::Everyone,
        usage: "ping",
        description: "Check the bot's latency",
    },
    CommandSpec {
        name: "version",
        aliases: &["bot", "model", "release"],
        permission: Permission::Everyone,
        usage: "version",
        description: "Show the running version",
    },
    CommandSpec {
        name: "help",
        aliases: &[],
        permission: Permission::Everyone,
        usage: "help",
        description: "List every command",
    },
];

/// Handler for utility commands
pub struct UtilityHandler;

#[async_trait]
impl PrefixCommandHandler for UtilityHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        &COMMANDS
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &Invocation,
        mut args: Args,
    ) -> BotResult<()> {
        match invocation.command {
            "profile" => self.handle_profile(invocation, &mut args).await,
            "roll" => self.handle_roll(invocation, &args).await,
            "flip" => {
                let face = flip(&mut rand::rng());
                invocation.reply(face).await?;
                Ok(())
            }
            "ping" => {
                let latency = invocation.platform.latency().await?;
                invocation
                    .reply(&format!("Pong! {} milliseconds", latency.as_millis()))
                    .await?;
                Ok(())
            }
            "version" => {
                invocation
                    .reply(&version_line(&ctx.settings, ctx.started_at))
                    .await?;
                Ok(())
            }
            "help" => {
                invocation
                    .reply(&truncate_for_message(&help_text(&ctx.settings, &ctx.catalog)))
                    .await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl UtilityHandler {
    async fn handle_profile(&self, invocation: &Invocation, args: &mut Args) -> BotResult<()> {
        let platform = invocation.platform.as_ref();
        let member = match args.next() {
            Some(raw) => ModerationTarget::resolve(platform, &raw).await?.member,
            None => platform
                .member_profile(invocation.invoker.user_id)
                .await?
                .ok_or_else(|| BotError::TargetNotFound("Member not found in this server.".into()))?,
        };
        invocation.reply(&profile_text(&member)).await?;
        Ok(())
    }

    async fn handle_roll(&self, invocation: &Invocation, args: &Args) -> BotResult<()> {
        let range = RollRange::parse(&args.remaining())?;
        // ThreadRng is not Send; keep it out of the await below
        let value = range.roll(&mut rand::rng());
        invocation.reply(&value.to_string()).await?;
        Ok(())
    }
}

pub fn profile_text(member: &MemberProfile) -> String {
    let joined = member
        .joined_at
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "**User Info:**\n\
         - Mention: {}\n\
         - Username: `{}`\n\
         - ID: `{}`\n\
         - Nickname: `{}`\n\
         - Bot: `{}`\n\
         - Top Role: `{}`\n\
         - Joined Server: `{}`\n\
         - Account Created: `{}`\n",
        mention(member.user_id),
        member.username,
        member.user_id,
        member.nickname.as_deref().unwrap_or("None"),
        member.bot,
        member.top_role.as_deref().unwrap_or("@everyone"),
        joined,
        member.created_at.format(TIMESTAMP_FORMAT),
    )
}

pub fn version_line(settings: &Settings, started_at: DateTime<Utc>) -> String {
    format!(
        "Current Version: {}, last updated {}",
        settings.version,
        started_at.format(TIMESTAMP_FORMAT)
    )
}

pub fn help_text(settings: &Settings, catalog: &[&'static CommandSpec]) -> String {
    let mut text = String::from("**Available Commands:**\n");
    for spec in catalog {
        text.push_str(&format!("`{}{}` - {}", settings.prefix, spec.usage, spec.description));
        if !spec.aliases.is_empty() {
            text.push_str(&format!(" (aliases: {})", spec.aliases.join(", ")));
        }
        match spec.permission.required_role(settings) {
            Some(role) => text.push_str(&format!(" [{role}]\n")),
            None => text.push('\n'),
        }
    }
    text
}
