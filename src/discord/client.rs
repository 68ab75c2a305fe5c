// src/discord/client.rs

use serenity::prelude::*;
use crate::config::Config;
use crate::cooldown::CooldownTracker;
use std::sync::Arc;
use std::time::Duration;
use log::{info, warn};
use serenity::gateway::ShardManager;
use tokio::sync::{RwLock, Mutex};

use super::events::EventHandler;
use super::presence::PresenceRotation;

/// Makes the shard manager reachable from command handlers through `ctx.data`.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

pub struct DiscordClient {
    client: Arc<Mutex<Option<Client>>>,
    shard_manager: Arc<ShardManager>,
    presence: Arc<PresenceRotation>,
}

impl DiscordClient {
    pub async fn new(
        config: Arc<RwLock<Config>>,
        cooldowns: Arc<CooldownTracker>,
    ) -> Result<Self, serenity::Error> {
        let token = {
            let config_read = config.read().await;
            config_read.token().map_err(|_| {
                serenity::Error::Other("Discord token not found in configuration")
            })?.to_string()
        };

        let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;

        let presence = Arc::new(PresenceRotation::new());
        let client = Client::builder(&token, intents)
            .event_handler(EventHandler::new(config.clone(), cooldowns, Arc::clone(&presence)))
            .await?;
        let shard_manager = client.shard_manager.clone();
        client.data.write().await.insert::<ShardManagerContainer>(Arc::clone(&shard_manager));

        Ok(Self {
            client: Arc::new(Mutex::new(Some(client))),
            shard_manager,
            presence,
        })
    }

    pub async fn shutdown(&self) {
        info!("Shutting down DiscordClient...");
        self.presence.stop();
        match tokio::time::timeout(Duration::from_secs(10), self.shard_manager.shutdown_all()).await {
            Ok(_) => info!("Discord shards shut down successfully"),
            Err(_) => warn!("Timed out while shutting down Discord shards"),
        }
        info!("DiscordClient shutdown complete.");
    }

    /// Runs the gateway connection until the shards stop.
    pub async fn start(&self) -> Result<(), serenity::Error> {
        let client = self.client.lock().await.take();
        match client {
            Some(mut client) => client.start().await,
            None => Err(serenity::Error::Other("Discord client has already been started")),
        }
    }
}
