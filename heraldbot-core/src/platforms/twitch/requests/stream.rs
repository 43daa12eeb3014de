// ========================================================
// File: src/platforms/twitch/requests/stream.rs
// ========================================================
use serde::Deserialize;
use tracing::debug;

use crate::platforms::twitch::client::TwitchHelixClient;
use crate::Error;

/// Response from "Get Users" endpoint.
#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    pub data: Vec<UserData>,
}

/// Single user record.
#[derive(Debug, Deserialize)]
pub struct UserData {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

/// Response from "Get Streams" endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamsResponse {
    pub data: Vec<StreamData>,
}

/// Single stream data record. An empty `data` array means the channel has
/// no active session.
#[derive(Debug, Deserialize)]
pub struct StreamData {
    pub id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(rename = "type")]
    pub type_field: String, // e.g., "live"
    #[serde(default)]
    pub title: String,
    pub started_at: String,
}

/// Looks up a Twitch account by login. `Ok(None)` means the account does
/// not exist.
pub async fn fetch_user_by_login(
    client: &TwitchHelixClient,
    login: &str,
) -> Result<Option<UserData>, Error> {
    let url = format!("https://api.twitch.tv/helix/users?login={}", login);
    let body = helix_get(client, &url).await?;

    let users: UsersResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Platform(format!("fetch_user_by_login parse error: {e}")))?;

    Ok(users.data.into_iter().next())
}

/// Fetches the active stream session for a login, if any. `Ok(None)` means
/// the channel is offline.
pub async fn fetch_stream_by_login(
    client: &TwitchHelixClient,
    login: &str,
) -> Result<Option<StreamData>, Error> {
    let url = format!("https://api.twitch.tv/helix/streams?user_login={}", login);
    let body = helix_get(client, &url).await?;

    let streams: StreamsResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Platform(format!("fetch_stream_by_login parse error: {e}")))?;

    if let Some(stream) = streams.data.first() {
        debug!(
            "Helix stream for '{}': type='{}', title='{}'",
            login, stream.type_field, stream.title
        );
    }

    Ok(streams.data.into_iter().next())
}

async fn helix_get(client: &TwitchHelixClient, url: &str) -> Result<String, Error> {
    let bearer = client.bearer_token().await?;

    let resp = client
        .http_client()
        .get(url)
        .header("Client-Id", client.client_id())
        .header("Authorization", format!("Bearer {}", bearer))
        .send()
        .await
        .map_err(|e| Error::Platform(format!("helix_get network error: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body_text = resp.text().await.unwrap_or_default();
        return Err(Error::Platform(format!(
            "helix_get: HTTP {} => {}",
            status, body_text
        )));
    }

    Ok(resp.text().await?)
}
