// File: src/platforms/twitch/auth.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::Error;

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// How close to expiry a cached token may get before we fetch a new one.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Deserialize)]
struct TwitchTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct AppAccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AppAccessToken {
    fn is_usable(&self) -> bool {
        self.expires_at - Utc::now() > Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

/// App-level (client-credentials) token provider. Fetches lazily on first
/// use and re-fetches once the cached token nears expiry. Helix requests
/// made with an app token cover everything this bot reads: user lookups
/// and public stream state.
pub struct TwitchAppAuth {
    client_id: String,
    client_secret: String,
    http: Arc<ReqwestClient>,
    current: Mutex<Option<AppAccessToken>>,
}

impl TwitchAppAuth {
    pub fn new(client_id: String, client_secret: String, http: Arc<ReqwestClient>) -> Self {
        Self {
            client_id,
            client_secret,
            http,
            current: Mutex::new(None),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns a valid bearer token, fetching or replacing the cached one
    /// as needed.
    pub async fn bearer_token(&self) -> Result<String, Error> {
        let mut guard = self.current.lock().await;
        if let Some(tok) = guard.as_ref() {
            if tok.is_usable() {
                return Ok(tok.token.clone());
            }
        }

        let fresh = self.fetch_app_token().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    async fn fetch_app_token(&self) -> Result<AppAccessToken, Error> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Error requesting app token: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "App token request failed: HTTP {} => {}",
                status, body_text
            )));
        }

        let parsed: TwitchTokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Error parsing app token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(parsed.expires_in as i64);
        debug!("Obtained Twitch app token, expires_at={}", expires_at);

        Ok(AppAccessToken {
            token: parsed.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_usable_until_expiry_margin() {
        let live = AppAccessToken {
            token: "abc".into(),
            expires_at: Utc::now() + Duration::seconds(3600),
        };
        assert!(live.is_usable());

        let nearly_expired = AppAccessToken {
            token: "abc".into(),
            expires_at: Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS - 5),
        };
        assert!(!nearly_expired.is_usable());

        let expired = AppAccessToken {
            token: "abc".into(),
            expires_at: Utc::now() - Duration::seconds(10),
        };
        assert!(!expired.is_usable());
    }

    #[test]
    fn token_response_parses() {
        let raw = r#"{"access_token":"xyz","expires_in":5011271,"token_type":"bearer"}"#;
        let parsed: TwitchTokenResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.access_token, "xyz");
        assert_eq!(parsed.expires_in, 5011271);
    }
}
