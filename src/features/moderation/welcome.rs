use log::{info, warn};

use crate::core::BotResult;
use crate::platform::{mention, ChatPlatform, UserId};

use super::target::grant_role;

/// Greet a new member and grant the default member role.
///
/// The greeting is sent first; a missing or ungrantable role is logged and
/// does not undo it.
pub async fn welcome_member(
    platform: &dyn ChatPlatform,
    user: UserId,
    member_role: &str,
) -> BotResult<()> {
    platform
        .send_message(&format!("Welcome {}!", mention(user)))
        .await?;

    match grant_role(platform, user, member_role).await {
        Ok(()) => info!("Granted {member_role} to new member {user}"),
        Err(e) => warn!("New member {user} left without {member_role}: {e}"),
    }
    Ok(())
}
