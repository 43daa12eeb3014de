// File: src/platforms/twitch/client.rs

use std::sync::Arc;

use reqwest::Client as ReqwestClient;

use crate::platforms::twitch::auth::TwitchAppAuth;
use crate::Error;

/// A small wrapper client for calling Helix endpoints.
///
/// Request building for individual endpoints lives in `requests::*`; this
/// struct is the shared entry point carrying the HTTP client and the app
/// credential.
pub struct TwitchHelixClient {
    http: Arc<ReqwestClient>,
    auth: TwitchAppAuth,
}

impl TwitchHelixClient {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        let http = Arc::new(ReqwestClient::new());
        let auth = TwitchAppAuth::new(
            client_id.to_string(),
            client_secret.to_string(),
            http.clone(),
        );
        Self { http, auth }
    }

    pub fn client_id(&self) -> &str {
        self.auth.client_id()
    }

    /// Current bearer token, fetched or refreshed through the app-token
    /// provider.
    pub async fn bearer_token(&self) -> Result<String, Error> {
        self.auth.bearer_token().await
    }

    pub fn http_client(&self) -> Arc<ReqwestClient> {
        self.http.clone()
    }
}
