//! Command handler registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Alias resolution; overlapping names are rejected at registration
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::handler::{CommandSpec, PrefixCommandHandler};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command name `{name}` of `{command}` is already taken by `{existing}`")]
    DuplicateName {
        name: &'static str,
        command: &'static str,
        existing: &'static str,
    },
}

/// A resolved command: its metadata plus the handler that runs it
#[derive(Clone)]
pub struct RegisteredCommand {
    pub spec: &'static CommandSpec,
    pub handler: Arc<dyn PrefixCommandHandler>,
}

/// Registry mapping command names and aliases to handlers
///
/// Built once at startup and read-only afterwards. Every name or alias maps
/// to exactly one command; a command may be reachable through several names.
///
/// # Example
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// registry.register(Arc::new(UtilityHandler))?;
///
/// if let Some(command) = registry.get("coinflip") {
///     assert_eq!(command.spec.name, "flip");
/// }
/// ```
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<RegisteredCommand>,
    lookup: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every command a handler declares.
    ///
    /// Either all of the handler's names are added or none are.
    pub fn register(&mut self, handler: Arc<dyn PrefixCommandHandler>) -> Result<(), RegistryError> {
        let mut pending: HashMap<&'static str, &'static str> = HashMap::new();
        for spec in handler.commands() {
            for name in spec.names() {
                let existing = self
                    .lookup
                    .get(name)
                    .map(|&i| self.commands[i].spec.name)
                    .or_else(|| pending.get(name).copied());
                if let Some(existing) = existing {
                    return Err(RegistryError::DuplicateName {
                        name,
                        command: spec.name,
                        existing,
                    });
                }
                pending.insert(name, spec.name);
            }
        }

        for spec in handler.commands() {
            let index = self.commands.len();
            self.commands.push(RegisteredCommand {
                spec,
                handler: Arc::clone(&handler),
            });
            for name in spec.names() {
                self.lookup.insert(name, index);
            }
        }
        Ok(())
    }

    /// Exact, case-sensitive lookup by name or alias
    pub fn get(&self, name: &str) -> Option<RegisteredCommand> {
        self.lookup.get(name).map(|&i| self.commands[i].clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Number of commands, not counting aliases
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command metadata in registration order
    pub fn specs(&self) -> Vec<&'static CommandSpec> {
        self.commands.iter().map(|c| c.spec).collect()
    }
}
