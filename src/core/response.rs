//! Response delivery: inline message or file attachment
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Size-based delivery policy with request-scoped scratch files
//! - 1.0.0: Message limit constants

use log::debug;
use std::path::Path;

use super::error::BotResult;
use super::scratch::ScratchFile;
use crate::platform::ChatPlatform;

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

const SCRATCH_PREFIX: &str = "response";

/// How a response of a given size reaches the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPlan {
    Inline,
    Attachment,
}

impl DeliveryPlan {
    /// Length is counted in characters, not bytes
    pub fn for_text(text: &str, inline_limit: usize) -> Self {
        if text.chars().count() <= inline_limit {
            DeliveryPlan::Inline
        } else {
            DeliveryPlan::Attachment
        }
    }
}

/// Where and how oversized responses are staged
#[derive(Debug, Clone)]
pub struct DeliveryPolicy<'a> {
    pub inline_limit: usize,
    pub scratch_dir: &'a Path,
    pub attachment_name: &'a str,
}

impl DeliveryPolicy<'_> {
    /// Send `text` inline when it fits, otherwise as an attached text file.
    ///
    /// Scratch-file failures abort the delivery; nothing partial is sent.
    pub async fn deliver(&self, platform: &dyn ChatPlatform, text: &str) -> BotResult<DeliveryPlan> {
        let plan = DeliveryPlan::for_text(text, self.inline_limit);
        match plan {
            DeliveryPlan::Inline => {
                platform.send_message(text).await?;
            }
            DeliveryPlan::Attachment => {
                debug!(
                    "Response of {} chars exceeds {}, sending as attachment",
                    text.chars().count(),
                    self.inline_limit
                );
                let scratch = ScratchFile::create(self.scratch_dir, SCRATCH_PREFIX, text).await?;
                platform
                    .send_file(scratch.path(), self.attachment_name)
                    .await?;
            }
        }
        Ok(plan)
    }
}

/// Truncate text to fit the message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    if text.chars().count() <= MESSAGE_LIMIT {
        text.to_string()
    } else {
        let kept: String = text.chars().take(MESSAGE_LIMIT - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{MockPlatform, Sent};

    fn policy(dir: &Path) -> DeliveryPolicy<'_> {
        DeliveryPolicy {
            inline_limit: MESSAGE_LIMIT,
            scratch_dir: dir,
            attachment_name: "long.txt",
        }
    }

    #[test]
    fn test_plan_boundary() {
        assert_eq!(DeliveryPlan::for_text(&"a".repeat(2000), 2000), DeliveryPlan::Inline);
        assert_eq!(DeliveryPlan::for_text(&"a".repeat(2001), 2000), DeliveryPlan::Attachment);
        assert_eq!(DeliveryPlan::for_text("", 2000), DeliveryPlan::Inline);
    }

    #[test]
    fn test_plan_counts_chars_not_bytes() {
        // 2000 multi-byte characters are still one message
        let text = "世".repeat(2000);
        assert_eq!(DeliveryPlan::for_text(&text, 2000), DeliveryPlan::Inline);
    }

    #[tokio::test]
    async fn test_deliver_inline() {
        let platform = MockPlatform::new();
        let dir = std::env::temp_dir();
        let text = "a".repeat(2000);

        let plan = policy(&dir).deliver(&platform, &text).await.unwrap();

        assert_eq!(plan, DeliveryPlan::Inline);
        assert_eq!(platform.sent(), vec![Sent::Message(text)]);
    }

    #[tokio::test]
    async fn test_deliver_attachment_and_cleanup() {
        let platform = MockPlatform::new();
        let dir = std::env::temp_dir();
        let text = "a".repeat(2001);

        let plan = policy(&dir).deliver(&platform, &text).await.unwrap();

        assert_eq!(plan, DeliveryPlan::Attachment);
        let sent = platform.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Sent::File { path, name, contents } => {
                assert_eq!(name, "long.txt");
                assert_eq!(contents, &text);
                assert!(!path.exists(), "scratch file should be removed after send");
            }
            other => panic!("expected file upload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deliver_attachment_scratch_failure_propagates() {
        let platform = MockPlatform::new();
        let dir = Path::new("/definitely/not/a/dir");

        let result = policy(dir).deliver(&platform, &"a".repeat(2001)).await;

        assert!(result.is_err());
        assert!(platform.sent().is_empty());
    }

    #[test]
    fn test_truncate_for_message() {
        assert_eq!(truncate_for_message("short"), "short");
        let result = truncate_for_message(&"a".repeat(3000));
        assert_eq!(result.chars().count(), MESSAGE_LIMIT);
        assert!(result.ends_with("..."));
    }
}
