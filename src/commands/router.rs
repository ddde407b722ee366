//! Command routing: prefix detection, lookup, role gate, error rendering
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::context::{CommandContext, Invocation, Invoker};
use super::parser::{parse_command, Args};
use super::registry::CommandRegistry;
use crate::core::BotError;
use crate::features::moderation::holds_role;
use crate::platform::ChatPlatform;

/// What happened to an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command
    Ignored,
    Completed,
    NotFound(String),
    /// Role gate failed; the handler did not run
    Denied,
    /// The handler ran and returned an error, already reported to the user
    Failed,
}

pub struct Router {
    registry: CommandRegistry,
    ctx: Arc<CommandContext>,
}

impl Router {
    pub fn new(registry: CommandRegistry, ctx: Arc<CommandContext>) -> Self {
        Self { registry, ctx }
    }

    pub fn context(&self) -> &Arc<CommandContext> {
        &self.ctx
    }

    /// Route one message. Never fails: every error ends up as a reply and a log line.
    pub async fn dispatch(
        &self,
        platform: Arc<dyn ChatPlatform>,
        invoker: Invoker,
        content: &str,
    ) -> DispatchOutcome {
        let settings = &self.ctx.settings;
        let Some(parsed) = parse_command(content, &settings.prefix) else {
            return DispatchOutcome::Ignored;
        };
        let request_id = Uuid::new_v4();

        let Some(command) = self.registry.get(parsed.name) else {
            info!("[{request_id}] Unknown command {:?} from {}", parsed.name, invoker.display_name);
            let err = BotError::CommandNotFound(parsed.name.to_string());
            if let Err(e) = platform.send_message(&err.to_string()).await {
                warn!("[{request_id}] Failed to report unknown command: {e}");
            }
            return DispatchOutcome::NotFound(parsed.name.to_string());
        };
        let spec = command.spec;

        if let Some(role) = spec.permission.required_role(settings) {
            if !holds_role(&invoker.role_names, role) {
                info!(
                    "[{request_id}] {} lacks role {role} for {}",
                    invoker.display_name, spec.name
                );
                let denied = BotError::PermissionDenied(format!(
                    "❌ You need the `{role}` role to use `{}{}`.",
                    settings.prefix, spec.name
                ));
                self.report(&platform, request_id, spec.name, &denied).await;
                return DispatchOutcome::Denied;
            }
        }

        info!(
            "[{request_id}] {} invoked {} (as {})",
            invoker.display_name, spec.name, parsed.name
        );
        let invocation = Invocation {
            platform: Arc::clone(&platform),
            invoker,
            command: spec.name,
            request_id,
        };
        let args = Args::new(parsed.body, spec.usage);

        let start = Instant::now();
        let result = command
            .handler
            .handle(Arc::clone(&self.ctx), &invocation, args)
            .await;

        match result {
            Ok(()) => {
                info!("[{request_id}] {} completed in {:?}", spec.name, start.elapsed());
                DispatchOutcome::Completed
            }
            Err(e) => {
                self.report(&platform, request_id, spec.name, &e).await;
                DispatchOutcome::Failed
            }
        }
    }

    async fn report(
        &self,
        platform: &Arc<dyn ChatPlatform>,
        request_id: Uuid,
        command: &str,
        err: &BotError,
    ) {
        let text = if err.is_user_facing() {
            info!("[{request_id}] {command} rejected: {err}");
            err.to_string()
        } else {
            error!("[{request_id}] {command} failed: {err}");
            format!("Something went wrong while running `{command}`.")
        };

        let sent = if err.is_transient() {
            platform
                .send_transient(&text, self.ctx.settings.transient_ttl())
                .await
        } else {
            platform.send_message(&text).await.map(|_| ())
        };
        if let Err(e) = sent {
            warn!("[{request_id}] Failed to send error reply: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handler::{CommandSpec, Permission, PrefixCommandHandler};
    use crate::commands::testing::test_context;
    use crate::core::BotResult;
    use crate::platform::testing::{MockPlatform, Sent};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Probe {
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    static PROBE_SPECS: [CommandSpec; 4] = [
        CommandSpec {
            name: "echo",
            aliases: &["say"],
            permission: Permission::Everyone,
            usage: "echo <n>",
            description: "",
        },
        CommandSpec {
            name: "wipe",
            aliases: &[],
            permission: Permission::Admin,
            usage: "wipe",
            description: "",
        },
        CommandSpec {
            name: "boom",
            aliases: &[],
            permission: Permission::Everyone,
            usage: "boom",
            description: "",
        },
        CommandSpec {
            name: "deny",
            aliases: &[],
            permission: Permission::Everyone,
            usage: "deny",
            description: "",
        },
    ];

    #[async_trait]
    impl PrefixCommandHandler for Probe {
        fn commands(&self) -> &'static [CommandSpec] {
            &PROBE_SPECS
        }

        async fn handle(
            &self,
            _ctx: Arc<CommandContext>,
            invocation: &Invocation,
            mut args: Args,
        ) -> BotResult<()> {
            self.calls.lock().unwrap().push((
                invocation.command.to_string(),
                args.remaining().iter().map(|s| s.to_string()).collect(),
            ));
            match invocation.command {
                "echo" => {
                    let n: i64 = args.parse("n")?;
                    invocation.reply(&n.to_string()).await?;
                    Ok(())
                }
                "boom" => Err(BotError::Io(std::io::Error::other("disk on fire"))),
                "deny" => Err(BotError::platform("Missing Permissions")),
                _ => Ok(()),
            }
        }
    }

    fn router(probe: Arc<Probe>) -> Router {
        let mut registry = CommandRegistry::new();
        registry.register(probe).unwrap();
        Router::new(registry, Arc::new(test_context(registry_specs())))
    }

    fn registry_specs() -> Vec<&'static CommandSpec> {
        PROBE_SPECS.iter().collect()
    }

    fn user(roles: &[&str]) -> Invoker {
        Invoker {
            user_id: 1,
            display_name: "Sam".to_string(),
            role_names: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_plain_message_is_ignored() {
        let probe = Arc::new(Probe::default());
        let platform = Arc::new(MockPlatform::new());
        let outcome = router(probe.clone())
            .dispatch(platform.clone(), user(&[]), "hello there")
            .await;
        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_alias_reaches_primary_handler() {
        let probe = Arc::new(Probe::default());
        let platform = Arc::new(MockPlatform::new());
        let outcome = router(probe.clone())
            .dispatch(platform.clone(), user(&[]), "!say 7")
            .await;

        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(probe.calls.lock().unwrap()[0].0, "echo");
        assert_eq!(platform.texts(), vec!["7"]);
    }

    #[tokio::test]
    async fn test_unknown_command_is_reported() {
        let probe = Arc::new(Probe::default());
        let platform = Arc::new(MockPlatform::new());
        let outcome = router(probe)
            .dispatch(platform.clone(), user(&[]), "!nope")
            .await;

        assert_eq!(outcome, DispatchOutcome::NotFound("nope".to_string()));
        assert_eq!(platform.texts(), vec!["Command \"nope\" is not found"]);
    }

    #[tokio::test]
    async fn test_role_gate_blocks_handler() {
        let probe = Arc::new(Probe::default());
        let platform = Arc::new(MockPlatform::new());
        let outcome = router(probe.clone())
            .dispatch(platform.clone(), user(&["Playtester"]), "!wipe")
            .await;

        assert_eq!(outcome, DispatchOutcome::Denied);
        assert!(probe.calls.lock().unwrap().is_empty());
        assert!(matches!(&platform.sent()[0], Sent::Transient(t) if t.contains("`Admin`")));
    }

    #[tokio::test]
    async fn test_role_gate_passes_exact_role() {
        let probe = Arc::new(Probe::default());
        let platform = Arc::new(MockPlatform::new());
        let outcome = router(probe.clone())
            .dispatch(platform.clone(), user(&["Admin"]), "!wipe")
            .await;
        assert_eq!(outcome, DispatchOutcome::Completed);

        let outcome = router(probe)
            .dispatch(platform, user(&["admin"]), "!wipe")
            .await;
        assert_eq!(outcome, DispatchOutcome::Denied);
    }

    #[tokio::test]
    async fn test_argument_error_is_reported_as_invalid_input() {
        let probe = Arc::new(Probe::default());
        let platform = Arc::new(MockPlatform::new());
        let outcome = router(probe)
            .dispatch(platform.clone(), user(&[]), "!echo seven")
            .await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(platform.texts(), vec!["Invalid input for `n`: `seven`"]);
    }

    #[tokio::test]
    async fn test_internal_error_is_not_leaked() {
        let probe = Arc::new(Probe::default());
        let platform = Arc::new(MockPlatform::new());
        let outcome = router(probe)
            .dispatch(platform.clone(), user(&[]), "!boom")
            .await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        let texts = platform.texts();
        assert_eq!(texts, vec!["Something went wrong while running `boom`."]);
    }

    #[tokio::test]
    async fn test_platform_error_is_transient() {
        let probe = Arc::new(Probe::default());
        let platform = Arc::new(MockPlatform::new());
        router(probe)
            .dispatch(platform.clone(), user(&[]), "!deny")
            .await;

        assert_eq!(
            platform.sent(),
            vec![Sent::Transient("Missing Permissions".to_string())]
        );
    }
}
