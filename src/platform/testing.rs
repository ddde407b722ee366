//! Recording platform used by unit tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use super::{ChatPlatform, MemberProfile, MessageRef, PollEmbed, RoleInfo, UserId};
use crate::core::{BotError, BotResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message(String),
    Transient(String),
    File {
        path: PathBuf,
        name: String,
        contents: String,
    },
    Embed(PollEmbed),
    Reaction {
        message: MessageRef,
        emoji: String,
    },
    Timeout {
        user: UserId,
        until: DateTime<Utc>,
    },
    TimeoutRemoved(UserId),
    RoleAdded {
        user: UserId,
        role: String,
    },
    Nickname {
        user: UserId,
        nickname: String,
    },
    Purge(u64),
    Slowmode(u64),
}

#[derive(Default)]
pub struct MockPlatform {
    sent: Mutex<Vec<Sent>>,
    members: HashMap<UserId, MemberProfile>,
    roles: Vec<RoleInfo>,
    timed_out: Mutex<HashMap<UserId, DateTime<Utc>>>,
    reject_member_edits: bool,
    next_message: Mutex<MessageRef>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, user: UserId, name: &str) -> Self {
        self.members.insert(user, profile(user, name));
        self
    }

    pub fn with_role(mut self, id: u64, name: &str) -> Self {
        self.roles.push(RoleInfo {
            id,
            name: name.to_string(),
            position: self.roles.len() as i64 + 1,
        });
        self
    }

    /// Make every member edit fail the way a missing Discord permission does
    pub fn rejecting_member_edits(mut self) -> Self {
        self.reject_member_edits = true;
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Text of every message, transient or not, in send order
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message(t) | Sent::Transient(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn is_timed_out(&self, user: UserId) -> bool {
        self.timed_out.lock().unwrap().contains_key(&user)
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }

    fn next_id(&self) -> MessageRef {
        let mut next = self.next_message.lock().unwrap();
        *next += 1;
        *next
    }

    fn member_edit(&self, user: UserId) -> BotResult<()> {
        if self.reject_member_edits {
            return Err(BotError::platform("Missing Permissions"));
        }
        if !self.members.contains_key(&user) {
            return Err(BotError::platform("Unknown Member"));
        }
        Ok(())
    }
}

pub fn profile(user: UserId, name: &str) -> MemberProfile {
    MemberProfile {
        user_id: user,
        username: name.to_string(),
        display_name: name.to_string(),
        nickname: None,
        bot: false,
        top_role: Some("@everyone".to_string()),
        joined_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single(),
        created_at: Utc.with_ymd_and_hms(2020, 6, 7, 8, 9, 10).unwrap(),
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn send_message(&self, text: &str) -> BotResult<MessageRef> {
        self.record(Sent::Message(text.to_string()));
        Ok(self.next_id())
    }

    async fn send_transient(&self, text: &str, _ttl: Duration) -> BotResult<()> {
        self.record(Sent::Transient(text.to_string()));
        Ok(())
    }

    async fn send_file(&self, path: &Path, display_name: &str) -> BotResult<()> {
        let contents = std::fs::read_to_string(path)?;
        self.record(Sent::File {
            path: path.to_path_buf(),
            name: display_name.to_string(),
            contents,
        });
        Ok(())
    }

    async fn send_embed(&self, embed: &PollEmbed) -> BotResult<MessageRef> {
        self.record(Sent::Embed(embed.clone()));
        Ok(self.next_id())
    }

    async fn add_reaction(&self, message: MessageRef, emoji: &str) -> BotResult<()> {
        self.record(Sent::Reaction {
            message,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn member_profile(&self, user: UserId) -> BotResult<Option<MemberProfile>> {
        Ok(self.members.get(&user).cloned())
    }

    async fn guild_roles(&self) -> BotResult<Vec<RoleInfo>> {
        Ok(self.roles.clone())
    }

    async fn add_role(&self, user: UserId, role: &RoleInfo) -> BotResult<()> {
        self.member_edit(user)?;
        self.record(Sent::RoleAdded {
            user,
            role: role.name.clone(),
        });
        Ok(())
    }

    async fn timeout_member(&self, user: UserId, until: DateTime<Utc>) -> BotResult<()> {
        self.member_edit(user)?;
        self.timed_out.lock().unwrap().insert(user, until);
        self.record(Sent::Timeout { user, until });
        Ok(())
    }

    async fn remove_timeout(&self, user: UserId) -> BotResult<()> {
        self.member_edit(user)?;
        self.timed_out.lock().unwrap().remove(&user);
        self.record(Sent::TimeoutRemoved(user));
        Ok(())
    }

    async fn set_nickname(&self, user: UserId, nickname: &str) -> BotResult<()> {
        self.member_edit(user)?;
        self.record(Sent::Nickname {
            user,
            nickname: nickname.to_string(),
        });
        Ok(())
    }

    async fn purge(&self, limit: u64) -> BotResult<usize> {
        self.record(Sent::Purge(limit));
        Ok(limit as usize)
    }

    async fn set_slowmode(&self, seconds: u64) -> BotResult<()> {
        self.record(Sent::Slowmode(seconds));
        Ok(())
    }

    async fn latency(&self) -> BotResult<Duration> {
        Ok(Duration::from_millis(42))
    }
}
