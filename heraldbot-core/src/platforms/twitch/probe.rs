// File: src/platforms/twitch/probe.rs

use tracing::{debug, warn};

use crate::platforms::twitch::client::TwitchHelixClient;
use crate::platforms::twitch::requests::stream::{fetch_stream_by_login, fetch_user_by_login};
use crate::Error;

/// Metadata carried by a live observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStreamMeta {
    pub display_name: String,
    /// Best-effort; Helix may omit it, in which case this is empty.
    pub title: String,
}

/// One probe's observation of a streamer's current state. Faults are an
/// explicit variant, consumed by exhaustive matching in the transition
/// detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSnapshot {
    /// The platform reports no such account.
    NotFound,
    /// Account exists, no active stream session.
    Offline,
    /// Account exists and is live.
    Live(LiveStreamMeta),
    /// Network or API fault; the caller must leave prior status untouched.
    ProbeFailed,
}

/// Queries Helix for the account and (if it exists) its active session.
/// Never fails outward: faults are logged and reported as `ProbeFailed`.
/// Every invocation hits the API fresh; nothing is cached here.
pub async fn probe_streamer(client: &TwitchHelixClient, login: &str) -> StreamSnapshot {
    match try_probe(client, login).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Probe for '{}' failed: {e}", login);
            StreamSnapshot::ProbeFailed
        }
    }
}

async fn try_probe(client: &TwitchHelixClient, login: &str) -> Result<StreamSnapshot, Error> {
    let user = match fetch_user_by_login(client, login).await? {
        Some(u) => u,
        None => {
            debug!("Twitch user not found: {}", login);
            return Ok(StreamSnapshot::NotFound);
        }
    };

    match fetch_stream_by_login(client, login).await? {
        Some(stream) => Ok(StreamSnapshot::Live(LiveStreamMeta {
            display_name: user.display_name,
            title: stream.title,
        })),
        None => Ok(StreamSnapshot::Offline),
    }
}
