//! Admin command handlers
//!
//! Handles: purge, slowmode, setmodel, settemp
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Channel maintenance and generation settings as prefix commands
//! - 1.0.0: Extracted from command_handler.rs

use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::{CommandContext, Invocation};
use crate::commands::handler::{CommandSpec, Permission, PrefixCommandHandler};
use crate::commands::parser::Args;
use crate::core::{BotError, BotResult};
use crate::features::generation::KNOWN_MODELS;

/// Discord's upper bound for per-user slowmode
pub const MAX_SLOWMODE_SECS: u64 = 21_600;

static COMMANDS: [CommandSpec; 4] = [
    CommandSpec {
        name: "purge",
        aliases: &[],
        permission: Permission::Admin,
        usage: "purge <amount>",
        description: "Bulk delete recent messages",
    },
    CommandSpec {
        name: "slowmode",
        aliases: &[],
        permission: Permission::Admin,
        usage: "slowmode <seconds>",
        description: "Set the channel's slowmode delay",
    },
    CommandSpec {
        name: "setmodel",
        aliases: &[],
        permission: Permission::Admin,
        usage: "setmodel <model>",
        description: "Switch the chat model",
    },
    CommandSpec {
        name: "settemp",
        aliases: &["temperature"],
        permission: Permission::Admin,
        usage: "settemp <0.0-2.0>",
        description: "Set the chat temperature",
    },
];

/// Handler for admin commands
pub struct AdminHandler;

#[async_trait]
impl PrefixCommandHandler for AdminHandler {
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
            "purge" => self.handle_purge(&ctx, invocation, &mut args).await,
            "slowmode" => self.handle_slowmode(invocation, &mut args).await,
            "setmodel" => self.handle_set_model(&ctx, invocation, &mut args).await,
            "settemp" => self.handle_set_temperature(&ctx, invocation, &mut args).await,
            _ => Ok(()),
        }
    }
}

impl AdminHandler {
    async fn handle_purge(
        &self,
        ctx: &CommandContext,
        invocation: &Invocation,
        args: &mut Args,
    ) -> BotResult<()> {
        let amount: i64 = args.parse("amount")?;
        if amount < 1 {
            return Err(BotError::invalid("Enter a number > 0"));
        }

        // One extra for the command message itself
        let deleted = invocation.platform.purge(amount as u64 + 1).await?;
        let reported = deleted.saturating_sub(1);
        info!("[{}] Purged {reported} messages", invocation.request_id);
        invocation
            .reply_transient(&ctx.settings, &format!("Deleted {reported} messages"))
            .await
    }

    async fn handle_slowmode(&self, invocation: &Invocation, args: &mut Args) -> BotResult<()> {
        let requested: i64 = args.parse("seconds")?;
        let seconds = (requested.max(0) as u64).min(MAX_SLOWMODE_SECS);
        invocation.platform.set_slowmode(seconds).await?;
        invocation
            .reply(&format!("Set slowmode to {seconds} seconds."))
            .await?;
        Ok(())
    }

    async fn handle_set_model(
        &self,
        ctx: &CommandContext,
        invocation: &Invocation,
        args: &mut Args,
    ) -> BotResult<()> {
        let model = args.required("model")?;
        let note = if KNOWN_MODELS.contains(&model.as_str()) {
            ""
        } else {
            " (not a known model, requests may fail)"
        };
        ctx.gateway.set_model(model.clone()).await;
        invocation
            .reply(&format!("Chat model set to `{model}`{note}."))
            .await?;
        Ok(())
    }

    async fn handle_set_temperature(
        &self,
        ctx: &CommandContext,
        invocation: &Invocation,
        args: &mut Args,
    ) -> BotResult<()> {
        let requested: f32 = args.parse("temperature")?;
        let applied = ctx.gateway.set_temperature(requested).await;
        invocation
            .reply(&format!("Chat temperature set to {applied}."))
            .await?;
        Ok(())
    }
}
