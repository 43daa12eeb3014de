use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use heraldbot_core::platforms::discord::DiscordPlatform;
use heraldbot_core::platforms::twitch::TwitchHelixClient;
use heraldbot_core::platforms::{PlatformAuth, PlatformIntegration};
use heraldbot_core::services::{CommandService, OutboundMessenger};
use heraldbot_core::tasks::stream_monitor::spawn_stream_monitor_task;
use heraldbot_core::{BotConfig, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "heraldbot")]
#[command(author, version, about = "HeraldBot - Discord announcement bot with Twitch live notifications")]
struct Args {
    /// Path to the JSON config file holding the Discord settings
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Seconds between Twitch poll cycles
    #[arg(long, default_value_t = 60)]
    poll_seconds: u64,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("heraldbot_core=info".parse().unwrap_or_default())
        .add_directive("heraldbot_server=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    dotenv::dotenv().ok();

    let args = Args::parse();
    info!(
        "HeraldBot starting. config={}, poll every {}s",
        args.config.display(),
        args.poll_seconds
    );

    if let Err(e) = run_bot(args).await {
        error!("Bot error: {:?}", e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_bot(args: Args) -> Result<(), Error> {
    let mut config = BotConfig::load(&args.config)?;
    config.poll_seconds = args.poll_seconds;
    let config = Arc::new(config);

    // 1) Discord: authenticate + connect. A failed login leaves the
    //    process running without a connection; there is no retry.
    let mut discord = DiscordPlatform::new(config.discord_token.clone());
    if let Err(e) = connect_discord(&mut discord).await {
        error!("Discord login failed: {e}");
        tokio::signal::ctrl_c().await?;
        info!("Ctrl-C detected; exiting.");
        return Ok(());
    }
    info!("Login request succeeded; Discord gateway connected.");

    let discord = Arc::new(discord);
    let messenger: Arc<dyn OutboundMessenger> = discord.clone();

    // 2) Twitch monitor, spawned only now that the gateway is up and the
    //    announce channel is deliverable.
    let helix = Arc::new(TwitchHelixClient::new(
        &config.twitch.client_id,
        &config.twitch.client_secret,
    ));
    let monitor_handle = spawn_stream_monitor_task(helix, messenger.clone(), config.clone());

    // 3) Command surface.
    let commands = CommandService::new(
        config.announcer_role_id.clone(),
        config.announcement_channel_id.clone(),
        messenger,
    );

    // 4) Main event loop until Ctrl-C.
    loop {
        tokio::select! {
            maybe_msg = discord.next_message_event() => {
                match maybe_msg {
                    Some(msg) => {
                        if let Err(e) = commands.handle_message(&msg).await {
                            error!("Command handling error: {e:?}");
                        }
                    }
                    None => {
                        error!("Discord event stream ended.");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C detected; shutting down.");
                break;
            }
        }
    }

    monitor_handle.abort();
    Ok(())
}

async fn connect_discord(discord: &mut DiscordPlatform) -> Result<(), Error> {
    discord.authenticate().await?;
    discord.connect().await
}
