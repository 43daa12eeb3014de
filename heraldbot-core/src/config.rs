// src/config.rs
//
// Runtime configuration. The Discord half (bot token, announcer role,
// announcement channel) comes from a JSON config file; the Twitch half
// (app credential, streamer list, optional notification-channel override)
// comes from environment variables. The server binary loads `.env` before
// calling `BotConfig::load`.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::Error;

pub const DEFAULT_POLL_SECONDS: u64 = 60;

/// On-disk shape of `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub token: String,

    /// Role id required for `!announce`. Missing means the command is
    /// effectively disabled (logged per use, never fatal).
    #[serde(rename = "announcer-role")]
    pub announcer_role: Option<String>,

    #[serde(rename = "announcementChannel")]
    pub announcement_channel: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TwitchConfig {
    pub client_id: String,
    pub client_secret: String,

    /// Logins to poll, in configured order. Blank entries already removed.
    pub streamers: Vec<String>,

    /// Overrides `announcement_channel` for live notifications only.
    pub announce_channel_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub announcer_role_id: Option<String>,
    pub announcement_channel_id: Option<String>,
    pub twitch: TwitchConfig,
    pub poll_seconds: u64,
}

impl BotConfig {
    /// Reads the JSON config file and the Twitch environment variables.
    /// Only an unreadable/unparsable config file or missing Twitch app
    /// credential is fatal; everything else degrades per command.
    pub fn load(config_path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(config_path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", config_path.display(), e))
        })?;
        let file: ConfigFile = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", config_path.display(), e)))?;

        let client_id = require_env("TWITCH_CLIENT_ID")?;
        let client_secret = require_env("TWITCH_CLIENT_SECRET")?;

        let streamers = parse_streamer_list(
            &env::var("TWITCH_STREAMERS").unwrap_or_default(),
        );
        if streamers.is_empty() {
            warn!("TWITCH_STREAMERS is empty; stream monitor will have nothing to poll");
        }

        Ok(Self {
            discord_token: file.token,
            announcer_role_id: file.announcer_role,
            announcement_channel_id: file.announcement_channel,
            twitch: TwitchConfig {
                client_id,
                client_secret,
                streamers,
                announce_channel_id: env::var("TWITCH_ANNOUNCE_CHANNEL_ID").ok(),
            },
            poll_seconds: DEFAULT_POLL_SECONDS,
        })
    }

    /// Channel that receives live notifications: the Twitch-specific
    /// override when set, else the general announcement channel.
    pub fn live_notify_channel(&self) -> Option<&str> {
        self.twitch
            .announce_channel_id
            .as_deref()
            .or(self.announcement_channel_id.as_deref())
    }
}

/// Splits the delimited streamer list, silently skipping malformed
/// (empty or whitespace-only) entries.
pub fn parse_streamer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn require_env(key: &str) -> Result<String, Error> {
    env::var(key).map_err(|_| Error::Config(format!("{key} is not set")))
}
