//! Per-command handler implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 3.0.0: Prefix command handlers (admin, moderation, chat, utility)
//! - 1.0.0: Initial extraction from monolithic command_handler.rs

pub mod admin;
pub mod chat;
pub mod moderation;
pub mod utility;

use std::sync::Arc;

use super::handler::PrefixCommandHandler;
use super::registry::{CommandRegistry, RegistryError};

/// Create all command handlers, in the order `help` lists them
pub fn create_all_handlers() -> Vec<Arc<dyn PrefixCommandHandler>> {
    vec![
        Arc::new(chat::ChatHandler),
        Arc::new(utility::UtilityHandler),
        Arc::new(moderation::ModerationHandler),
        Arc::new(admin::AdminHandler),
    ]
}

/// Registry holding every built-in command
pub fn default_registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    for handler in create_all_handlers() {
        registry.register(handler)?;
    }
    Ok(registry)
}
