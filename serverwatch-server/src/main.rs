use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use serverwatch_core::platforms::discord::{DiscordPlatform, GatewayEvent};
use serverwatch_core::platforms::steam::SteamStatusClient;
use serverwatch_core::tasks::StatusPoller;
use serverwatch_core::BotConfig;

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("serverwatch=info"));
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .context("Failed to set global subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = BotConfig::from_env().context("Invalid configuration")?;
    info!(
        "ServerWatch starting. channel={}, server={}:{}, interval={}s",
        config.channel_id,
        config.server_address,
        config.server_port,
        config.update_interval.as_secs()
    );

    let source = SteamStatusClient::from_config(&config)?;

    let mut platform = DiscordPlatform::new(config.discord_token.clone());
    platform.connect().await?;
    let channel = platform.status_channel(config.channel_id)?;
    let mut gateway_events = platform
        .take_gateway_events()
        .context("Gateway event stream unavailable after connect")?;

    let poller = Arc::new(StatusPoller::new(source, channel, config.update_interval));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    // Ctrl-C flips the shutdown watch
    let _ctrlc_handle = {
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {:?}", e);
                return;
            }
            info!("Ctrl-C detected; shutting down...");
            let _ = tx.send(true);
        })
    };

    let mut poller_task = None;
    let mut shutdown_watch = shutdown_rx.clone();
    loop {
        tokio::select! {
            event = gateway_events.recv() => match event {
                Some(GatewayEvent::Ready { shard_id, user }) => {
                    info!("Bot is ready as {user} (shard {shard_id}).");
                    if let Some(task) = poller.start(shutdown_rx.clone()) {
                        poller_task = Some(task);
                    }
                }
                None => {
                    warn!("Gateway event stream ended; stopping.");
                    break;
                }
            },
            Ok(_) = shutdown_watch.changed() => {
                if *shutdown_watch.borrow() {
                    info!("Shutdown signaled; exiting main loop.");
                    break;
                }
            }
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(task) = poller_task {
        match task.await {
            Ok(handle) => info!("Status loop finished (message={handle:?})."),
            Err(e) => error!("Status loop task failed: {e:?}"),
        }
    }

    platform.disconnect().await?;
    info!("Main finished. Goodbye!");
    Ok(())
}
