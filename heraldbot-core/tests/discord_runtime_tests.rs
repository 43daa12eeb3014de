// tests/discord_runtime_tests.rs

use heraldbot_core::platforms::discord::DiscordPlatform;
use heraldbot_core::platforms::{ConnectionStatus, PlatformAuth, PlatformIntegration};
use heraldbot_core::Error;

#[tokio::test]
async fn test_discord_auth_requires_token() -> Result<(), Error> {
    let mut discord = DiscordPlatform::new(String::new());
    assert!(!discord.is_authenticated().await?);
    assert!(discord.authenticate().await.is_err());

    let mut discord = DiscordPlatform::new("some-token".to_string());
    discord.authenticate().await?;
    assert!(discord.is_authenticated().await?);
    Ok(())
}

#[tokio::test]
async fn test_disconnect_before_connect_is_clean() -> Result<(), Error> {
    let mut discord = DiscordPlatform::new("some-token".to_string());

    let status = discord.get_connection_status().await?;
    assert_eq!(status, ConnectionStatus::Disconnected);

    discord.disconnect().await?;
    let status = discord.get_connection_status().await?;
    assert_eq!(status, ConnectionStatus::Disconnected);
    Ok(())
}

#[tokio::test]
async fn test_next_message_event_none_before_connect() {
    let discord = DiscordPlatform::new("some-token".to_string());
    let evt = discord.next_message_event().await;
    assert!(evt.is_none(), "No receiver exists before connect");
}

#[tokio::test]
async fn test_send_message_rejects_non_numeric_channel_id() {
    let discord = DiscordPlatform::new("some-token".to_string());
    let res = PlatformIntegration::send_message(&discord, "not-a-snowflake", "hi").await;
    assert!(matches!(res, Err(Error::Platform(_))));
}
