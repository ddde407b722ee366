//! Prefix command handler trait and command metadata
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Prefix commands with aliases and role gates replace slash commands
//! - 1.0.0: Initial implementation for modular command handling

use async_trait::async_trait;
use std::sync::Arc;

use super::context::{CommandContext, Invocation};
use super::parser::Args;
use crate::core::{BotResult, Settings};

/// Who may run a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Everyone,
    /// Requires the configured moderator role
    Moderator,
    /// Requires the configured admin role
    Admin,
}

impl Permission {
    /// The exact role name required, if any
    pub fn required_role<'a>(&self, settings: &'a Settings) -> Option<&'a str> {
        match self {
            Permission::Everyone => None,
            Permission::Moderator => Some(&settings.moderator_role),
            Permission::Admin => Some(&settings.admin_role),
        }
    }
}

/// Static description of one command
#[derive(Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub permission: Permission,
    /// Argument synopsis without the prefix, e.g. `purge <amount>`
    pub usage: &'static str,
    pub description: &'static str,
}

impl CommandSpec {
    /// Primary name followed by aliases
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

/// Trait for prefix command handlers
///
/// A handler serves one or more commands that share logic and dispatches on
/// [`Invocation::command`], which is always the primary name even when the
/// user typed an alias.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl PrefixCommandHandler for PingHandler {
///     fn commands(&self) -> &'static [CommandSpec] {
///         &[CommandSpec {
///             name: "ping",
///             aliases: &[],
///             permission: Permission::Everyone,
///             usage: "ping",
///             description: "Check the bot's latency",
///         }]
///     }
///
///     async fn handle(&self, _ctx: Arc<CommandContext>, inv: &Invocation, _args: Args) -> BotResult<()> {
///         inv.reply("Pong!").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait PrefixCommandHandler: Send + Sync {
    /// Commands this handler processes
    fn commands(&self) -> &'static [CommandSpec];

    /// Run the command. User-facing errors are rendered by the router.
    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &Invocation,
        args: Args,
    ) -> BotResult<()>;
}
