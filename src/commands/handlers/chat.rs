//! Chat command handler
//!
//! Handles: c (hey, chat)
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

use crate::commands::context::{CommandContext, Invocation};
use crate::commands::handler::{CommandSpec, Permission, PrefixCommandHandler};
use crate::commands::parser::Args;
use crate::core::BotResult;
use crate::features::generation::Generation;

static COMMANDS: [CommandSpec; 1] = [CommandSpec {
    name: "c",
    aliases: &["hey", "chat"],
    permission: Permission::Everyone,
    usage: "c <message>",
    description: "Ask the chat model (no memory between messages)",
}];

pub const UNAVAILABLE_MESSAGE: &str =
    "Sorry, the chat model is unavailable right now. Please try again later.";

pub const EMPTY_MESSAGE: &str = "The chat model returned an empty response.";

/// Wrap the user's text in the brevity instruction sent to the model
pub fn build_prompt(message: &str) -> String {
    format!("Keep your message brief but detailed:\n<START OF PROMPT>\n{message}\n<END OF PROMPT>")
}

/// Handler for the chat command
pub struct ChatHandler;

#[async_trait]
impl PrefixCommandHandler for ChatHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        &COMMANDS
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &Invocation,
        mut args: Args,
    ) -> BotResult<()> {
        let request_id = invocation.request_id;
        let message = args.required_rest("message")?;

        info!("[{request_id}] Chat prompt of {} chars", message.chars().count());
        let response = match ctx.gateway.safe_generate(&build_prompt(&message)).await? {
            Generation::Text(text) => text,
            Generation::Unavailable { attempts } => {
                warn!("[{request_id}] Chat unavailable after {attempts} attempts");
                invocation.reply(UNAVAILABLE_MESSAGE).await?;
                return Ok(());
            }
        };

        if response.trim().is_empty() {
            invocation.reply(EMPTY_MESSAGE).await?;
            return Ok(());
        }

        let plan = ctx.deliver(invocation, &response).await?;
        info!(
            "[{request_id}] Delivered {} chars as {plan:?}",
            response.chars().count()
        );
        Ok(())
    }
}
