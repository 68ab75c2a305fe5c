// src/discord/commands/info.rs
use serenity::builder::{CreateCommand, CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::prelude::*;
use serenity::prelude::*;
use std::time::Duration;
use crate::discord::embeds;
use super::CommandSpec;

pub fn register(spec: &CommandSpec) -> CreateCommand {
    CreateCommand::new(spec.name).description(spec.description)
}

/// `1d 2h 3m 4s`
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}

struct GuildSummary {
    name: String,
    id: GuildId,
    members: u64,
    channels: usize,
    roles: usize,
}

pub async fn run(ctx: &Context, command: &CommandInteraction, uptime: Duration) -> Result<(), serenity::Error> {
    let (bot_name, bot_id) = {
        let me = ctx.cache.current_user();
        (me.name.clone(), me.id)
    };

    // Pull what we need out of the cache before awaiting anything.
    let guild = command.guild_id.and_then(|id| {
        id.to_guild_cached(&ctx.cache).map(|guild| GuildSummary {
            name: guild.name.clone(),
            id: guild.id,
            members: guild.member_count,
            channels: guild.channels.len(),
            roles: guild.roles.len(),
        })
    });

    let mut embed = embeds::info("🤖 Bot Information")
        .field("Bot Name", bot_name, true)
        .field("Bot ID", bot_id.to_string(), true)
        .field("Created At", embeds::relative_timestamp(bot_id.created_at()), true)
        .field("Uptime", format_uptime(uptime), true)
        .field("Servers", ctx.cache.guild_count().to_string(), true)
        .field("Users", ctx.cache.user_count().to_string(), true)
        .field("Version", env!("CARGO_PKG_VERSION"), true);

    if let Some(guild) = guild {
        embed = embed
            .field("Server Name", guild.name, true)
            .field("Server ID", guild.id.to_string(), true)
            .field("Created", embeds::relative_timestamp(guild.id.created_at()), true)
            .field("Members", guild.members.to_string(), true)
            .field("Channels", guild.channels.to_string(), true)
            .field("Roles", guild.roles.to_string(), true);
    }

    command.create_response(&ctx.http, CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new().embed(embed)
    )).await
}
