pub mod config;
pub mod cooldown;
pub mod discord;
pub mod logging;

use std::sync::Arc;
use std::time::Duration;
use log::{error, info};
use tokio::sync::RwLock;
use crate::config::Config;
use crate::cooldown::CooldownTracker;
use crate::discord::DiscordClient;

pub async fn run(config: Arc<RwLock<Config>>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cooldowns = Arc::new(CooldownTracker::new());

    let sweep_secs = config.read().await.cooldown_sweep_secs;
    if sweep_secs > 0 {
        cooldowns.spawn_sweeper(Duration::from_secs(sweep_secs));
        info!("Cooldown sweep runs every {}s", sweep_secs);
    }

    let discord = Arc::new(DiscordClient::new(Arc::clone(&config), Arc::clone(&cooldowns)).await?);

    let mut gateway = tokio::spawn({
        let discord = Arc::clone(&discord);
        async move { discord.start().await }
    });

    info!("Bot is now running. Press Ctrl+C to exit.");

    tokio::select! {
        result = &mut gateway => {
            match result {
                Ok(Ok(())) => info!("Discord client stopped."),
                Ok(Err(e)) => error!("Discord client error: {}", e),
                Err(e) => error!("Discord client task failed: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down.");
            discord.shutdown().await;
        }
    }

    info!("Bot has shut down.");
    Ok(())
}
