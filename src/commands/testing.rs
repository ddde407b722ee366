//! Context builders for handler and router tests

use std::sync::Arc;
use std::time::Duration;

use super::context::{CommandContext, Invocation, Invoker};
use super::handler::CommandSpec;
use crate::core::Settings;
use crate::features::generation::backend::testing::StaticBackend;
use crate::features::generation::retry::testing::RecordingSleeper;
use crate::features::generation::{Backoff, GenerationBackend, GenerationGateway, GenerationSession};
use crate::platform::testing::MockPlatform;
use uuid::Uuid;

pub fn test_context(catalog: Vec<&'static CommandSpec>) -> CommandContext {
    test_context_with(Arc::new(StaticBackend::replying(&["ok"])), catalog)
}

pub fn test_context_with(
    backend: Arc<dyn GenerationBackend>,
    catalog: Vec<&'static CommandSpec>,
) -> CommandContext {
    let settings = Settings::default();
    let session = GenerationSession::new(
        "test-key",
        settings.generation.model.clone(),
        settings.generation.temperature,
        settings.generation.max_attempts,
    )
    .unwrap();
    let backoff = Backoff::fixed(Duration::from_secs(15))
        .with_sleeper(Arc::new(RecordingSleeper::default()));
    let gateway = GenerationGateway::new(backend, session, backoff, 2);
    CommandContext::new(Arc::new(settings), Arc::new(gateway), catalog)
}

pub fn invocation(platform: Arc<MockPlatform>, command: &'static str, roles: &[&str]) -> Invocation {
    Invocation {
        platform,
        invoker: Invoker {
            user_id: 1,
            display_name: "Sam".to_string(),
            role_names: roles.iter().map(|r| r.to_string()).collect(),
        },
        command,
        request_id: Uuid::new_v4(),
    }
}
