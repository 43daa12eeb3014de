// File: src/services/command_service.rs

use std::sync::Arc;

use rand::seq::IndexedRandom;
use tracing::{debug, error, info, warn};

use crate::platforms::discord::DiscordMessageEvent;
use crate::services::message_sender::OutboundMessenger;
use crate::Error;

const HELP_TRIGGER: &str = "!help";
const ANNOUNCE_TRIGGER: &str = "!announce";
const DECIDE_TRIGGER: &str = "!decide";

const HELP_TEXT: &str = "I can help make announcements!: Use '!announce [message]'";

/// Fixed pool for `!decide`; one is picked uniformly at random.
pub const DECIDE_RESPONSES: [&str; 10] = [
    "Yes! ✨",
    "No... 😔",
    "Maybe? 🤔",
    "Absolutely! 💯",
    "Not a chance! ❌",
    "Ask again later 🕐",
    "Definitely! 🌟",
    "I don't think so 🤷",
    "Without a doubt! ✅",
    "Ummmm 🤫",
];

/// Handles the text-prefix command surface. All failures end at a log line
/// plus, where a user is waiting, a reply; nothing propagates far enough to
/// take the process down.
pub struct CommandService {
    announcer_role_id: Option<String>,
    announcement_channel_id: Option<String>,
    messenger: Arc<dyn OutboundMessenger>,
}

impl CommandService {
    pub fn new(
        announcer_role_id: Option<String>,
        announcement_channel_id: Option<String>,
        messenger: Arc<dyn OutboundMessenger>,
    ) -> Self {
        debug!("Initializing CommandService");
        Self {
            announcer_role_id,
            announcement_channel_id,
            messenger,
        }
    }

    /// Dispatches one inbound message. Triggers are case-sensitive
    /// prefixes on the raw content.
    pub async fn handle_message(&self, msg: &DiscordMessageEvent) -> Result<(), Error> {
        if msg.author_is_bot {
            debug!("Ignoring bot message from {}", msg.author_name);
            return Ok(());
        }

        if msg.text.starts_with(HELP_TRIGGER) {
            info!("!help command detected");
            self.reply(msg, HELP_TEXT).await;
            return Ok(());
        }

        if let Some(rest) = msg.text.strip_prefix(ANNOUNCE_TRIGGER) {
            return self.handle_announce(msg, rest).await;
        }

        if let Some(rest) = msg.text.strip_prefix(DECIDE_TRIGGER) {
            return self.handle_decide(msg, rest).await;
        }

        Ok(())
    }

    /// Relays the given text to the announcement channel, gated on the
    /// announcer role. The authorization gates are explicit early returns,
    /// silent toward the user.
    async fn handle_announce(&self, msg: &DiscordMessageEvent, rest: &str) -> Result<(), Error> {
        info!("!announce command detected");

        if msg.guild_id.is_none() {
            debug!("!announce outside a guild => ignoring");
            return Ok(());
        }
        let Some(role_id) = self.announcer_role_id.as_ref() else {
            warn!("Announcer role id not configured => ignoring !announce");
            return Ok(());
        };
        if !msg.role_ids.iter().any(|r| r == role_id) {
            debug!("User {} lacks the announcer role => ignoring", msg.author_name);
            return Ok(());
        }

        let announcement = rest.trim();
        if announcement.is_empty() {
            warn!("No announcement text provided");
            self.reply(msg, "Please include a message to announce.").await;
            return Ok(());
        }

        let Some(channel_id) = self.announcement_channel_id.as_ref() else {
            error!("Announcement channel not configured");
            self.reply(msg, "❌ I can't find the announcements channel. Check config.json.")
                .await;
            return Ok(());
        };

        match self.messenger.send_message(channel_id, announcement).await {
            Ok(()) => {
                info!("Announcement delivered to channel {}", channel_id);
                self.reply(msg, "✅ Announcement sent to #announcements.").await;
            }
            Err(e) => {
                error!("Failed to send announcement: {e}");
                self.reply(msg, "❌ Failed to send announcement. Check bot logs.")
                    .await;
            }
        }

        Ok(())
    }

    async fn handle_decide(&self, msg: &DiscordMessageEvent, rest: &str) -> Result<(), Error> {
        let question = rest.trim();

        let response = DECIDE_RESPONSES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(DECIDE_RESPONSES[0]);

        let reply_text = if question.is_empty() {
            response.to_string()
        } else {
            format!("> {}\n{}", question, response)
        };

        self.reply(msg, &reply_text).await;
        Ok(())
    }

    /// Reply failures are logged, never propagated.
    async fn reply(&self, msg: &DiscordMessageEvent, text: &str) {
        if let Err(e) = self
            .messenger
            .reply_to(&msg.channel_id, &msg.message_id, text)
            .await
        {
            error!("Failed to reply in channel {}: {e}", msg.channel_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::message_sender::MockOutboundMessenger;

    fn guild_message(text: &str, roles: &[&str]) -> DiscordMessageEvent {
        DiscordMessageEvent {
            message_id: "10".into(),
            channel_id: "20".into(),
            guild_id: Some("30".into()),
            author_id: "40".into(),
            author_name: "tester".into(),
            author_is_bot: false,
            text: text.into(),
            role_ids: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn announce_without_role_makes_no_outbound_calls() {
        let mut mock = MockOutboundMessenger::new();
        mock.expect_send_message().times(0);
        mock.expect_reply_to().times(0);

        let svc = CommandService::new(
            Some("role-1".into()),
            Some("chan-1".into()),
            Arc::new(mock),
        );
        let msg = guild_message("!announce big news", &["other-role"]);
        svc.handle_message(&msg).await.unwrap();
    }

    #[tokio::test]
    async fn announce_in_dm_makes_no_outbound_calls() {
        let mut mock = MockOutboundMessenger::new();
        mock.expect_send_message().times(0);
        mock.expect_reply_to().times(0);

        let svc = CommandService::new(
            Some("role-1".into()),
            Some("chan-1".into()),
            Arc::new(mock),
        );
        let mut msg = guild_message("!announce big news", &["role-1"]);
        msg.guild_id = None;
        svc.handle_message(&msg).await.unwrap();
    }

    #[tokio::test]
    async fn announce_with_blank_text_warns_and_never_sends() {
        let mut mock = MockOutboundMessenger::new();
        mock.expect_send_message().times(0);
        mock.expect_reply_to()
            .withf(|_, _, text| text == "Please include a message to announce.")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = CommandService::new(
            Some("role-1".into()),
            Some("chan-1".into()),
            Arc::new(mock),
        );
        let msg = guild_message("!announce   ", &["role-1"]);
        svc.handle_message(&msg).await.unwrap();
    }

    #[tokio::test]
    async fn announce_relays_text_verbatim_and_confirms() {
        let mut mock = MockOutboundMessenger::new();
        mock.expect_send_message()
            .withf(|channel, text| channel == "chan-1" && text == "big news tonight")
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_reply_to()
            .withf(|_, _, text| text.starts_with("✅"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = CommandService::new(
            Some("role-1".into()),
            Some("chan-1".into()),
            Arc::new(mock),
        );
        let msg = guild_message("!announce big news tonight", &["role-1"]);
        svc.handle_message(&msg).await.unwrap();
    }

    #[tokio::test]
    async fn announce_send_failure_is_reported_to_invoker() {
        let mut mock = MockOutboundMessenger::new();
        mock.expect_send_message()
            .times(1)
            .returning(|_, _| Err(Error::Platform("channel not found".into())));
        mock.expect_reply_to()
            .withf(|_, _, text| text.starts_with("❌ Failed to send announcement"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = CommandService::new(
            Some("role-1".into()),
            Some("chan-1".into()),
            Arc::new(mock),
        );
        let msg = guild_message("!announce big news", &["role-1"]);
        svc.handle_message(&msg).await.unwrap();
    }

    #[tokio::test]
    async fn bot_authored_messages_are_ignored() {
        let mut mock = MockOutboundMessenger::new();
        mock.expect_send_message().times(0);
        mock.expect_reply_to().times(0);

        let svc = CommandService::new(
            Some("role-1".into()),
            Some("chan-1".into()),
            Arc::new(mock),
        );
        let mut msg = guild_message("!decide am I a robot", &[]);
        msg.author_is_bot = true;
        svc.handle_message(&msg).await.unwrap();
    }
}
