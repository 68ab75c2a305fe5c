use serenity::async_trait;
use serenity::model::prelude::*;
use serenity::prelude::*;
use crate::config::Config;
use crate::cooldown::CooldownTracker;
use crate::logging::log_command;
use std::sync::Arc;
use std::time::{Duration, Instant};
use log::{debug, error, info, warn};
use serenity::builder::CreateInteractionResponseFollowup;
use tokio::sync::RwLock;
use crate::discord::commands::{
    self, clear, cooldowns, help, kick, ping, respond_ephemeral, CommandKind, CommandSpec,
};
use crate::discord::embeds;
use crate::discord::presence::{self, PresenceRotation};

const COMMAND_FAILED: &str = "There was an error while executing this command!";
const OWNER_ONLY: &str = "This command is restricted to bot owners.";
const NOT_IMPLEMENTED: &str = "Command not implemented.";

pub struct EventHandler {
    config: Arc<RwLock<Config>>,
    cooldowns: Arc<CooldownTracker>,
    started_at: Instant,
    presence: Arc<PresenceRotation>,
}

impl EventHandler {
    pub fn new(
        config: Arc<RwLock<Config>>,
        cooldowns: Arc<CooldownTracker>,
        presence: Arc<PresenceRotation>,
    ) -> Self {
        Self {
            config,
            cooldowns,
            started_at: Instant::now(),
            presence,
        }
    }

    async fn dispatch(&self, ctx: &Context, command: &CommandInteraction, spec: &CommandSpec) -> Result<(), serenity::Error> {
        let default_cooldown = {
            let config = self.config.read().await;
            if spec.owner_only && !config.is_owner(command.user.id.get()) {
                drop(config);
                warn!("{} tried owner-only command {}", command.user.name, spec.name);
                return respond_ephemeral(ctx, command, embeds::error(OWNER_ONLY)).await;
            }
            config.default_cooldown
        };

        let user_id = command.user.id.to_string();
        match commands::cooldown_gate(self.cooldowns.as_ref(), &user_id, spec, default_cooldown) {
            Ok(Some(notice)) => {
                debug!("{} is on cooldown for {}", user_id, spec.name);
                return respond_ephemeral(ctx, command, embeds::cooldown(notice)).await;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Cooldown check failed for {}: {}", spec.name, e);
                return respond_ephemeral(ctx, command, embeds::error(COMMAND_FAILED)).await;
            }
        }

        let guild = command.guild_id.map(|id| id.to_string());
        log_command(spec.name, &command.user.name, guild.as_deref());

        match spec.kind {
            CommandKind::Ping => ping::run(ctx, command).await,
            CommandKind::Help => help::run(ctx, command, default_cooldown).await,
            CommandKind::Info => commands::info::run(ctx, command, self.started_at.elapsed()).await,
            CommandKind::Kick => kick::run(ctx, command).await,
            CommandKind::Clear => clear::run(ctx, command).await,
            CommandKind::Cooldowns => cooldowns::run(ctx, command, self.cooldowns.as_ref()).await,
        }
    }

    /// Tells the user the command failed, following up if a response already exists.
    async fn report_failure(ctx: &Context, command: &CommandInteraction) {
        if respond_ephemeral(ctx, command, embeds::error(COMMAND_FAILED)).await.is_ok() {
            return;
        }
        let followup = CreateInteractionResponseFollowup::new()
            .embed(embeds::error(COMMAND_FAILED))
            .ephemeral(true);
        if let Err(why) = command.create_followup(&ctx.http, followup).await {
            error!("Cannot report command failure: {}", why);
        }
    }
}

#[async_trait]
impl serenity::client::EventHandler for EventHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let (guild_id, rotation) = {
            let config_read = self.config.read().await;
            (config_read.guild_id(), config_read.status_rotation_secs)
        };

        let registered = match guild_id {
            Some(guild_id) => GuildId::new(guild_id)
                .set_commands(&ctx.http, commands::register_all())
                .await
                .map(|cmds| (cmds.len(), format!("guild {}", guild_id))),
            None => Command::set_global_commands(&ctx.http, commands::register_all())
                .await
                .map(|cmds| (cmds.len(), "global scope".to_string())),
        };
        match registered {
            Ok((count, scope)) => info!("Registered {} slash commands for {}", count, scope),
            Err(why) => error!("Failed to register slash commands: {}", why),
        }

        if rotation > 0 {
            self.presence.replace(presence::spawn_rotation(ctx, Duration::from_secs(rotation)));
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            debug!("Received command interaction: {}", command.data.name);

            let result = match commands::find(&command.data.name) {
                Some(spec) => self.dispatch(&ctx, &command, spec).await,
                None => {
                    warn!("Command not found: {}", command.data.name);
                    respond_ephemeral(&ctx, &command, embeds::error(NOT_IMPLEMENTED)).await
                }
            };

            if let Err(why) = result {
                error!("Error executing command {}: {}", command.data.name, why);
                Self::report_failure(&ctx, &command).await;
            }
        }
    }
}
