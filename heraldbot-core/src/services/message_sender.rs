// File: src/services/message_sender.rs

use async_trait::async_trait;

use crate::Error;

/// Outbound side of the chat platform, as seen by the command service and
/// the stream monitor. `DiscordPlatform` is the production implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutboundMessenger: Send + Sync {
    /// Posts `text` to the channel with the given id. Destination lookup
    /// happens per call; nothing is cached.
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), Error>;

    /// Replies to a specific message in a channel.
    async fn reply_to(&self, channel_id: &str, message_id: &str, text: &str)
        -> Result<(), Error>;
}
