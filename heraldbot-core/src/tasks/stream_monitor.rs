// File: src/tasks/stream_monitor.rs
//
// Periodic live-status polling: probe every configured streamer, diff the
// observation against the last-known status, and announce channels that
// just went live. Offline transitions only update local state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::BotConfig;
use crate::platforms::twitch::probe::{probe_streamer, LiveStreamMeta, StreamSnapshot};
use crate::platforms::twitch::TwitchHelixClient;
use crate::services::message_sender::OutboundMessenger;
use crate::Error;

/// Last-known liveness per streamer login. Absent key means "not live".
/// Owned by the monitor task; written only through `detect_transition`.
/// Process-lifetime only, so a restart mid-stream re-announces on the next
/// poll.
#[derive(Debug, Default)]
pub struct LiveStatusTable {
    inner: HashMap<String, bool>,
}

impl LiveStatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self, login: &str) -> bool {
        self.inner.get(login).copied().unwrap_or(false)
    }

    fn set_live(&mut self, login: &str, live: bool) {
        self.inner.insert(login.to_string(), live);
    }
}

/// Classification of one snapshot relative to prior known status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTransition {
    BecameLive(LiveStreamMeta),
    BecameOffline,
    Unchanged,
    Ignored,
}

/// Edge-triggered diff of a probe observation against the status table.
/// `NotFound` and `ProbeFailed` never touch the table, so the streamer is
/// simply skipped until the next cycle.
pub fn detect_transition(
    table: &mut LiveStatusTable,
    login: &str,
    snapshot: &StreamSnapshot,
) -> StreamTransition {
    match snapshot {
        StreamSnapshot::NotFound | StreamSnapshot::ProbeFailed => StreamTransition::Ignored,
        StreamSnapshot::Live(meta) => {
            if table.is_live(login) {
                StreamTransition::Unchanged
            } else {
                table.set_live(login, true);
                StreamTransition::BecameLive(meta.clone())
            }
        }
        StreamSnapshot::Offline => {
            if table.is_live(login) {
                table.set_live(login, false);
                StreamTransition::BecameOffline
            } else {
                StreamTransition::Unchanged
            }
        }
    }
}

pub fn format_live_announcement(login: &str, meta: &LiveStreamMeta) -> String {
    let title = if meta.title.is_empty() {
        "(no title)"
    } else {
        meta.title.as_str()
    };
    format!(
        "📢 **{} is LIVE on Twitch!** \n🔗 https://twitch.tv/{}\n**Title:** {}",
        meta.display_name, login, title
    )
}

/// One poll cycle: probe and diff every configured streamer in list order.
/// A failed probe or a rejected announcement skips that streamer only;
/// the rest of the cycle proceeds.
pub async fn check_streams(
    helix: &TwitchHelixClient,
    messenger: &Arc<dyn OutboundMessenger>,
    config: &BotConfig,
    table: &mut LiveStatusTable,
) -> Result<(), Error> {
    debug!(
        "Checking streams... ({} streamer(s) configured)",
        config.twitch.streamers.len()
    );

    // Destination is resolved per cycle, never cached at spawn.
    let Some(announce_channel) = config.live_notify_channel() else {
        error!(
            "No announce channel configured (TWITCH_ANNOUNCE_CHANNEL_ID or announcementChannel). Skipping."
        );
        return Ok(());
    };

    for login in &config.twitch.streamers {
        let snapshot = probe_streamer(helix, login).await;

        match detect_transition(table, login, &snapshot) {
            StreamTransition::BecameLive(meta) => {
                info!("{} went live => announcing", meta.display_name);
                let content = format_live_announcement(login, &meta);
                if let Err(e) = messenger.send_message(announce_channel, &content).await {
                    error!("Failed to send live announcement for '{}': {e}", login);
                }
            }
            StreamTransition::BecameOffline => {
                info!("{} is now offline", login);
            }
            StreamTransition::Unchanged => {
                debug!("No change for '{}'", login);
            }
            StreamTransition::Ignored => {
                debug!("Skipping '{}' this cycle", login);
            }
        }
    }

    Ok(())
}

/// Spawns the polling loop. Call once, after the chat connection is
/// established so the announce channel is deliverable. The first cycle
/// runs immediately; afterwards a tick fires only once the previous cycle
/// has completed (missed ticks are delayed, not burst), so cycles never
/// overlap.
pub fn spawn_stream_monitor_task(
    helix: Arc<TwitchHelixClient>,
    messenger: Arc<dyn OutboundMessenger>,
    config: Arc<BotConfig>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut table = LiveStatusTable::new();

        let mut ticker = interval(Duration::from_secs(config.poll_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Twitch stream monitor started (polling every {}s)",
            config.poll_seconds
        );

        loop {
            ticker.tick().await;
            if let Err(e) = check_streams(&helix, &messenger, &config, &mut table).await {
                error!("Stream check cycle failed: {e:?}");
            }
        }
    })
}
