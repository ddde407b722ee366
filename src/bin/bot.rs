use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use warden::commands::{default_registry, CommandContext, Invoker, Router};
use warden::core::{Config, Settings};
use warden::features::generation::{
    ApiKeySource, Backoff, GeminiBackend, GenerationGateway, GenerationSession,
};
use warden::features::moderation::welcome_member;
use warden::platform::DiscordPlatform;

struct Handler {
    router: Arc<Router>,
    settings: Arc<Settings>,
}

impl Handler {
    /// Names of the author's guild roles, resolved from the cache or the API
    async fn role_names(ctx: &Context, msg: &Message) -> Vec<String> {
        let (Some(guild_id), Some(member)) = (msg.guild_id, msg.member.as_ref()) else {
            return Vec::new();
        };
        if member.roles.is_empty() {
            return Vec::new();
        }

        let roles = match ctx.cache.guild(guild_id) {
            Some(guild) => guild.roles,
            None => match guild_id.roles(&ctx.http).await {
                Ok(roles) => roles,
                Err(e) => {
                    warn!("Failed to fetch roles for guild {guild_id}: {e}");
                    return Vec::new();
                }
            },
        };
        member
            .roles
            .iter()
            .filter_map(|id| roles.get(id).map(|r| r.name.clone()))
            .collect()
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !msg.content.starts_with(&self.settings.prefix) {
            return;
        }

        let invoker = Invoker {
            user_id: msg.author.id.0,
            display_name: msg
                .member
                .as_ref()
                .and_then(|m| m.nick.clone())
                .unwrap_or_else(|| msg.author.name.clone()),
            role_names: Self::role_names(&ctx, &msg).await,
        };
        let platform = Arc::new(DiscordPlatform::new(
            ctx.http.clone(),
            msg.guild_id,
            msg.channel_id,
        ));

        let outcome = self.router.dispatch(platform, invoker, &msg.content).await;
        debug!("Message {} in channel {}: {outcome:?}", msg.id, msg.channel_id);
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        if new_member.user.bot {
            return;
        }
        let guild_id: GuildId = new_member.guild_id;
        let channel = match guild_id.to_partial_guild(&ctx.http).await {
            Ok(guild) => guild.system_channel_id,
            Err(e) => {
                error!("Failed to look up guild {guild_id} for welcome: {e}");
                return;
            }
        };
        let Some(channel_id) = channel else {
            info!("Guild {guild_id} has no system channel; skipping welcome");
            return;
        };

        let platform = DiscordPlatform::new(ctx.http.clone(), Some(guild_id), channel_id);
        info!("👋 {} joined guild {guild_id}", new_member.user.name);
        if let Err(e) = welcome_member(
            &platform,
            new_member.user.id.0,
            &self.settings.member_role,
        )
        .await
        {
            error!("Failed to welcome {}: {e}", new_member.user.name);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }
        let session = self.router.context().gateway.session().await;
        info!(
            "💬 Chat model {} at temperature {}",
            session.model(),
            session.temperature()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Warden Discord Bot...");

    let settings = Arc::new(Settings::load(&config.settings_path)?);

    let api_key = ApiKeySource::new(&config.api_key_file)
        .resolve()
        .map_err(|e| {
            error!("❌ {e}");
            anyhow!("Cannot start without a Google API key")
        })?;
    let session = GenerationSession::new(
        api_key,
        settings.generation.model.clone(),
        settings.generation.temperature,
        settings.generation.max_attempts,
    )?;
    let backend = Arc::new(GeminiBackend::new(reqwest::Client::new()));
    let gateway = Arc::new(GenerationGateway::new(
        backend,
        session,
        Backoff::fixed(settings.retry_delay()),
        settings.generation.max_concurrent,
    ));

    let registry = default_registry()?;
    info!("📋 Registered {} commands", registry.len());
    let ctx = Arc::new(CommandContext::new(
        settings.clone(),
        gateway,
        registry.specs(),
    ));
    let handler = Handler {
        router: Arc::new(Router::new(registry, ctx)),
        settings,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;

    // Build the Discord client with proper gateway configuration
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow!("Client creation failed: {}", e)
        })?;

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Privileged intents (members, message content) not enabled");
        error!("  - Discord API outage");
        return Err(anyhow!("Failed to establish gateway connection: {}", why));
    }

    Ok(())
}
