//! Moderator command handlers
//!
//! Handles: mute, unmute, poll, setnick, role
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::{CommandContext, Invocation};
use crate::commands::handler::{CommandSpec, Permission, PrefixCommandHandler};
use crate::commands::parser::Args;
use crate::core::{BotError, BotResult};
use crate::features::moderation::{ModerationTarget, Poll};

static COMMANDS: [CommandSpec; 5] = [
    CommandSpec {
        name: "mute",
        aliases: &["timeout", "gotojail"],
        permission: Permission::Moderator,
        usage: "mute <@member> [seconds] [reason]",
        description: "Time a member out",
    },
    CommandSpec {
        name: "unmute",
        aliases: &["jailbreak", "rtimeout"],
        permission: Permission::Moderator,
        usage: "unmute <@member>",
        description: "Lift a member's timeout",
    },
    CommandSpec {
        name: "poll",
        aliases: &["makepoll", "question"],
        permission: Permission::Moderator,
        usage: "poll \"<question>\" <option>, <option>, ...",
        description: "Start a reaction poll with 2 to 10 options",
    },
    CommandSpec {
        name: "setnick",
        aliases: &["nick"],
        permission: Permission::Moderator,
        usage: "setnick <@member> <nickname>",
        description: "Change a member's nickname",
    },
    CommandSpec {
        name: "role",
        aliases: &["addrole", "apply"],
        permission: Permission::Moderator,
        usage: "role <@member> <role name>",
        description: "Give a member a role",
    },
];

/// Handler for moderator commands
pub struct ModerationHandler;

#[async_trait]
impl PrefixCommandHandler for ModerationHandler {
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
            "mute" => self.handle_mute(&ctx, invocation, &mut args).await,
            "unmute" => self.handle_unmute(invocation, &mut args).await,
            "poll" => self.handle_poll(invocation, &mut args).await,
            "setnick" => self.handle_setnick(invocation, &mut args).await,
            "role" => self.handle_role(&ctx, invocation, &mut args).await,
            _ => Ok(()),
        }
    }
}

impl ModerationHandler {
    async fn handle_mute(
        &self,
        ctx: &CommandContext,
        invocation: &Invocation,
        args: &mut Args,
    ) -> BotResult<()> {
        let settings = &ctx.settings;
        let mention = args.required("member")?;
        let seconds: i64 = args.parse_or("seconds", settings.default_mute_secs)?;
        let reason = args.rest();

        let platform = invocation.platform.as_ref();
        let target = ModerationTarget::resolve(platform, &mention).await?;
        let applied = target
            .apply_timeout(platform, seconds, settings.max_timeout_secs)
            .await?;

        if let Some(reason) = &reason {
            info!(
                "[{}] Timeout reason for {}: {reason}",
                invocation.request_id, target.member.username
            );
        }
        let plural = if applied > 1 { "s" } else { "" };
        invocation
            .reply(&format!(
                "🔇 {} has been timed out for {applied} second{plural}.",
                target.mention()
            ))
            .await?;
        Ok(())
    }

    async fn handle_unmute(&self, invocation: &Invocation, args: &mut Args) -> BotResult<()> {
        let mention = args.required("member")?;
        let platform = invocation.platform.as_ref();
        let target = ModerationTarget::resolve(platform, &mention).await?;
        target.remove_timeout(platform).await?;
        invocation
            .reply(&format!("✅ Timeout removed for {}.", target.mention()))
            .await?;
        Ok(())
    }

    async fn handle_poll(&self, invocation: &Invocation, args: &mut Args) -> BotResult<()> {
        let question = args.required("question")?;
        let options = args.required_rest("options")?;
        let poll = Poll::parse(&question, &options)?;
        poll.publish(invocation.platform.as_ref(), &invocation.invoker.display_name)
            .await?;
        info!(
            "[{}] Poll \"{}\" created with {} options",
            invocation.request_id,
            poll.question,
            poll.options.len()
        );
        Ok(())
    }

    async fn handle_setnick(&self, invocation: &Invocation, args: &mut Args) -> BotResult<()> {
        let mention = args.required("member")?;
        let nickname = args.required_rest("nickname")?;
        let platform = invocation.platform.as_ref();
        let target = ModerationTarget::resolve(platform, &mention).await?;
        target.set_nickname(platform, &nickname).await?;
        invocation
            .reply(&format!(
                "Changed nickname for {} to `{}`.",
                target.mention(),
                nickname.trim()
            ))
            .await?;
        Ok(())
    }

    async fn handle_role(
        &self,
        ctx: &CommandContext,
        invocation: &Invocation,
        args: &mut Args,
    ) -> BotResult<()> {
        let mention = args.required("member")?;
        let role_name = args.required_rest("role name")?;
        if role_name == ctx.settings.admin_role {
            return Err(BotError::PermissionDenied(format!(
                "Cannot add {}",
                ctx.settings.admin_role
            )));
        }

        let platform = invocation.platform.as_ref();
        let target = ModerationTarget::resolve(platform, &mention).await?;
        target.grant_role(platform, &role_name).await?;
        invocation
            .reply(&format!("Success! Added role {role_name}"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{invocation, test_context};
    use crate::platform::testing::{MockPlatform, Sent};

    async fn run(platform: &Arc<MockPlatform>, command: &'static str, body: &str) -> BotResult<()> {
        let ctx = Arc::new(test_context(vec![]));
        let inv = invocation(platform.clone(), command, &["Playtester"]);
        ModerationHandler
            .handle(ctx, &inv, Args::new(body, "usage"))
            .await
    }

    fn guild() -> Arc<MockPlatform> {
        Arc::new(
            MockPlatform::new()
                .with_member(7, "alice")
                .with_role(1, "Admin")
                .with_role(2, "Playtester"),
        )
    }

    #[tokio::test]
    async fn test_mute_defaults_to_fifteen_seconds() {
        let platform = guild();
        run(&platform, "mute", "<@7>").await.unwrap();

        assert!(platform.is_timed_out(7));
        assert_eq!(
            platform.texts(),
            vec!["🔇 <@7> has been timed out for 15 seconds."]
        );
    }

    #[tokio::test]
    async fn test_mute_clamps_duration() {
        let platform = guild();
        run(&platform, "mute", "<@7> 0 spamming").await.unwrap();
        run(&platform, "mute", "<@7> 99999999").await.unwrap();

        assert_eq!(
            platform.texts(),
            vec![
                "🔇 <@7> has been timed out for 1 second.",
                "🔇 <@7> has been timed out for 24192 seconds.",
            ]
        );
    }

    #[tokio::test]
    async fn test_mute_bad_mention_and_missing_member() {
        let platform = guild();
        let err = run(&platform, "mute", "alice").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid mention format.");

        let err = run(&platform, "mute", "<@8>").await.unwrap_err();
        assert_eq!(err.to_string(), "Member not found in this server.");
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unmute_clears_timeout() {
        let platform = guild();
        run(&platform, "mute", "<@7> 60").await.unwrap();
        run(&platform, "unmute", "<@7>").await.unwrap();

        assert!(!platform.is_timed_out(7));
        assert_eq!(platform.texts()[1], "✅ Timeout removed for <@7>.");
    }

    #[tokio::test]
    async fn test_poll_with_quoted_question() {
        let platform = guild();
        run(&platform, "poll", r#""Movie night?" yes, no, maybe"#)
            .await
            .unwrap();

        let sent = platform.sent();
        match &sent[0] {
            Sent::Embed(embed) => {
                assert_eq!(embed.title, "📊 Movie night?");
                assert_eq!(embed.footer, "Poll created by Sam");
            }
            other => panic!("expected embed, got {other:?}"),
        }
        assert_eq!(sent.len(), 4);
    }

    #[tokio::test]
    async fn test_poll_rejects_single_option() {
        let platform = guild();
        let err = run(&platform, "poll", r#""Yes?" yes"#).await.unwrap_err();
        assert!(matches!(err, BotError::InvalidArgument(_)));
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_setnick() {
        let platform = guild();
        run(&platform, "setnick", "<@7> Captain Al").await.unwrap();
        assert_eq!(
            platform.texts(),
            vec!["Changed nickname for <@7> to `Captain Al`."]
        );
    }

    #[tokio::test]
    async fn test_role_grant_and_refusals() {
        let platform = guild();
        run(&platform, "role", "<@7> Playtester").await.unwrap();
        assert_eq!(platform.texts(), vec!["Success! Added role Playtester"]);

        let err = run(&platform, "role", "<@7> Admin").await.unwrap_err();
        assert!(matches!(err, BotError::PermissionDenied(_)));

        let err = run(&platform, "role", "<@7> Wizard").await.unwrap_err();
        assert!(matches!(err, BotError::TargetNotFound(_)));
    }
}
