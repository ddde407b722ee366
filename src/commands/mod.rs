//! # Command System
//!
//! Prefix command (`!name args`) handling for guild messages.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Prefix commands with aliases, role gates and typed errors
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod handler;
pub mod handlers;
pub mod parser;
pub mod registry;
pub mod router;
#[cfg(test)]
pub(crate) mod testing;

pub use context::{CommandContext, Invocation, Invoker};
pub use handler::{CommandSpec, Permission, PrefixCommandHandler};
pub use handlers::{create_all_handlers, default_registry};
pub use parser::{parse_command, Args, ParsedCommand};
pub use registry::{CommandRegistry, RegisteredCommand, RegistryError};
pub use router::{DispatchOutcome, Router};
