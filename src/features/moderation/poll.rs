//! Reaction polls
//!
//! A poll is an embed listing numbered options, followed by one number
//! reaction per option so members can vote by clicking.

use log::{debug, warn};

use crate::core::{BotError, BotResult};
use crate::platform::{ChatPlatform, MessageRef, PollEmbed};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

pub const NUMBER_EMOJIS: [&str; MAX_OPTIONS] = [
    "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
];

pub const OPTION_COUNT_MESSAGE: &str =
    "❌ You must provide between 2 and 10 options, separated by commas.";

#[derive(Debug, Clone, PartialEq)]
pub struct Poll {
    pub question: String,
    pub options: Vec<String>,
}

impl Poll {
    /// Build a poll from a comma-separated option list. Blank entries are dropped.
    pub fn parse(question: &str, raw_options: &str) -> BotResult<Self> {
        let options: Vec<String> = raw_options
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
        Self::new(question, options)
    }

    pub fn new(question: &str, options: Vec<String>) -> BotResult<Self> {
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(BotError::invalid(OPTION_COUNT_MESSAGE));
        }
        Ok(Self {
            question: question.trim().to_string(),
            options,
        })
    }

    pub fn embed(&self, author: &str) -> PollEmbed {
        let description = self
            .options
            .iter()
            .zip(NUMBER_EMOJIS)
            .map(|(option, emoji)| format!("{emoji} {option}"))
            .collect::<Vec<_>>()
            .join("\n");

        PollEmbed {
            title: format!("📊 {}", self.question),
            description,
            footer: format!("Poll created by {author}"),
        }
    }

    /// Post the embed and add reactions in option order.
    ///
    /// A failed reaction is logged and skipped; the poll stays usable with
    /// the remaining options.
    pub async fn publish(&self, platform: &dyn ChatPlatform, author: &str) -> BotResult<MessageRef> {
        let message = platform.send_embed(&self.embed(author)).await?;
        for emoji in NUMBER_EMOJIS.iter().take(self.options.len()) {
            if let Err(e) = platform.add_reaction(message, emoji).await {
                warn!("Failed to add poll reaction {emoji}: {e}");
            }
        }
        debug!("Published poll with {} options", self.options.len());
        Ok(message)
    }
}
