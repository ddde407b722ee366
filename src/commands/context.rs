//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Per-invocation platform handle and generation gateway
//! - 1.0.0: Initial implementation with core shared state

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::handler::CommandSpec;
use crate::core::{BotResult, DeliveryPlan, DeliveryPolicy, Settings};
use crate::features::generation::GenerationGateway;
use crate::platform::{ChatPlatform, MessageRef, UserId};

/// Services shared by every handler, built once at startup
pub struct CommandContext {
    pub settings: Arc<Settings>,
    pub gateway: Arc<GenerationGateway>,
    pub started_at: DateTime<Utc>,
    /// Every registered command, for `help`
    pub catalog: Vec<&'static CommandSpec>,
}

impl CommandContext {
    pub fn new(
        settings: Arc<Settings>,
        gateway: Arc<GenerationGateway>,
        catalog: Vec<&'static CommandSpec>,
    ) -> Self {
        Self {
            settings,
            gateway,
            started_at: Utc::now(),
            catalog,
        }
    }

    /// Send a possibly oversized response per the delivery settings
    pub async fn deliver(&self, invocation: &Invocation, text: &str) -> BotResult<DeliveryPlan> {
        let scratch_dir = self.settings.scratch_dir();
        let policy = DeliveryPolicy {
            inline_limit: self.settings.delivery.inline_limit,
            scratch_dir: &scratch_dir,
            attachment_name: &self.settings.delivery.attachment_name,
        };
        policy.deliver(invocation.platform.as_ref(), text).await
    }
}

/// The user who sent a command
#[derive(Debug, Clone)]
pub struct Invoker {
    pub user_id: UserId,
    pub display_name: String,
    pub role_names: Vec<String>,
}

/// One command invocation, scoped to the channel it came from
pub struct Invocation {
    pub platform: Arc<dyn ChatPlatform>,
    pub invoker: Invoker,
    /// Primary name of the resolved command
    pub command: &'static str,
    pub request_id: Uuid,
}

impl Invocation {
    pub async fn reply(&self, text: &str) -> BotResult<MessageRef> {
        self.platform.send_message(text).await
    }

    /// Reply with a message that removes itself after the configured lifetime
    pub async fn reply_transient(&self, settings: &Settings, text: &str) -> BotResult<()> {
        self.platform
            .send_transient(text, settings.transient_ttl())
            .await
    }
}
