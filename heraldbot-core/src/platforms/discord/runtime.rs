use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    Shard,
    MessageSender,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::gateway::payload::incoming::{MessageCreate, Ready as ReadyPayload};
use twilight_model::id::marker::{ChannelMarker, MessageMarker};
use twilight_model::id::Id;

use crate::platforms::{ConnectionStatus, PlatformAuth, PlatformIntegration};
use crate::services::message_sender::OutboundMessenger;
use crate::Error;

/// One inbound guild/DM message, reduced to what command handling needs:
/// the reply target, the authorization inputs, and the text.
#[derive(Debug, Clone)]
pub struct DiscordMessageEvent {
    pub message_id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub author_is_bot: bool,
    pub text: String,
    pub role_ids: Vec<String>,
}

/// Shard runner: pulls gateway events and forwards inbound chat
/// messages to `tx`. Role ids come straight off the message payload, so
/// no member fetch is needed for the permission check downstream.
async fn shard_runner(mut shard: Shard, tx: UnboundedSender<DiscordMessageEvent>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        match item {
            Ok(event) => match &event {
                Event::Ready(ready) => {
                    let data: &ReadyPayload = ready.as_ref();
                    info!(
                        "Shard {shard_id} => READY as {}#{} (ID={})",
                        data.user.name, data.user.discriminator, data.user.id
                    );
                }
                Event::MessageCreate(msg_create) => {
                    let msg: &MessageCreate = msg_create;
                    debug!("Message received: '{}'", msg.content);

                    let role_ids: Vec<String> = msg
                        .member
                        .as_ref()
                        .map(|m| m.roles.iter().map(|r| r.to_string()).collect())
                        .unwrap_or_default();

                    let _ = tx.send(DiscordMessageEvent {
                        message_id: msg.id.to_string(),
                        channel_id: msg.channel_id.to_string(),
                        guild_id: msg.guild_id.map(|g| g.to_string()),
                        author_id: msg.author.id.to_string(),
                        author_name: msg.author.name.clone(),
                        author_is_bot: msg.author.bot,
                        text: msg.content.clone(),
                        role_ids,
                    });
                }
                _ => {
                    trace!("Shard {shard_id} => unhandled event: {event:?}");
                }
            },
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

pub struct DiscordPlatform {
    pub token: String,
    pub connection_status: ConnectionStatus,

    /// Receiver for inbound messages; None until `connect` runs.
    pub rx: Mutex<Option<UnboundedReceiver<DiscordMessageEvent>>>,

    pub shard_tasks: Vec<JoinHandle<()>>,
    pub shard_senders: Vec<MessageSender>,

    pub http: Option<Arc<HttpClient>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            rx: Mutex::new(None),
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http: None,
        }
    }

    /// Awaits the next inbound message, or None once disconnected.
    pub async fn next_message_event(&self) -> Option<DiscordMessageEvent> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(r) => r.recv().await,
            None => None,
        }
    }

    fn parse_channel_id(channel: &str) -> Result<Id<ChannelMarker>, Error> {
        let channel_id_u64: u64 = channel
            .parse()
            .map_err(|_| Error::Platform(format!("Invalid channel ID: {channel}")))?;
        Ok(Id::<ChannelMarker>::new(channel_id_u64))
    }
}

#[async_trait]
impl PlatformAuth for DiscordPlatform {
    async fn authenticate(&mut self) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        Ok(())
    }

    async fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(!self.token.is_empty())
    }
}

#[async_trait]
impl PlatformIntegration for DiscordPlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }

        let (tx, rx) = unbounded_channel::<DiscordMessageEvent>();
        {
            let mut guard = self.rx.lock().await;
            *guard = Some(rx);
        }

        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        self.http = Some(http_client.clone());

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT,
        );

        let shards = gateway::create_recommended(&http_client, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?;

        for shard in shards {
            self.shard_senders.push(shard.sender());

            let tx_for_shard = tx.clone();
            let handle = tokio::spawn(async move {
                shard_runner(shard, tx_for_shard).await;
            });
            self.shard_tasks.push(handle);
        }

        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }

        self.shard_senders.clear();
        self.shard_tasks.clear();

        {
            let mut guard = self.rx.lock().await;
            *guard = None;
        }

        Ok(())
    }

    async fn send_message(&self, channel: &str, message: &str) -> Result<(), Error> {
        let channel_id = Self::parse_channel_id(channel)?;

        if let Some(http) = &self.http {
            http.create_message(channel_id)
                .content(message)
                .await
                .map_err(|e| Error::Platform(format!("Error sending Discord message: {e:?}")))?;
        }

        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}

/// The command service and stream monitor talk to Discord through this
/// seam rather than the concrete platform struct.
#[async_trait]
impl OutboundMessenger for DiscordPlatform {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), Error> {
        PlatformIntegration::send_message(self, channel_id, text).await
    }

    async fn reply_to(&self, channel_id: &str, message_id: &str, text: &str) -> Result<(), Error> {
        let channel_id = Self::parse_channel_id(channel_id)?;
        let message_id_u64: u64 = message_id
            .parse()
            .map_err(|_| Error::Platform(format!("Invalid message ID: {message_id}")))?;
        let message_id = Id::<MessageMarker>::new(message_id_u64);

        if let Some(http) = &self.http {
            http.create_message(channel_id)
                .reply(message_id)
                .content(text)
                .await
                .map_err(|e| Error::Platform(format!("Error sending Discord reply: {e:?}")))?;
        }

        Ok(())
    }
}
