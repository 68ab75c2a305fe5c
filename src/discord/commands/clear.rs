// src/discord/commands/clear.rs
use serenity::builder::{CreateCommand, CreateCommandOption, EditInteractionResponse, GetMessages};
use serenity::model::prelude::*;
use serenity::prelude::*;
use log::{error, info};
use crate::discord::embeds;
use super::{has_permission, option, respond_ephemeral, CommandSpec};

pub const MAX_AMOUNT: u8 = 100;

/// Discord refuses to bulk delete messages older than two weeks.
const BULK_DELETE_WINDOW_SECS: i64 = 14 * 24 * 60 * 60;

pub fn parse_amount(raw: Option<i64>) -> Result<u8, &'static str> {
    match raw {
        Some(amount) if (1..=i64::from(MAX_AMOUNT)).contains(&amount) => Ok(amount as u8),
        Some(_) => Err("Amount must be between 1 and 100."),
        None => Err("Please specify how many messages to delete."),
    }
}

pub fn within_bulk_window(created: Timestamp, now: Timestamp) -> bool {
    now.unix_timestamp() - created.unix_timestamp() < BULK_DELETE_WINDOW_SECS
}

pub fn register(spec: &CommandSpec) -> CreateCommand {
    CreateCommand::new(spec.name)
        .description(spec.description)
        .default_member_permissions(Permissions::MANAGE_MESSAGES)
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "amount", "Number of messages to delete (1-100)")
                .required(true)
                .min_int_value(1)
                .max_int_value(u64::from(MAX_AMOUNT)),
        )
}

async fn delete_recent(ctx: &Context, channel: ChannelId, amount: u8) -> Result<usize, serenity::Error> {
    let now = Timestamp::now();
    let ids: Vec<MessageId> = channel
        .messages(&ctx.http, GetMessages::new().limit(amount))
        .await?
        .into_iter()
        .filter(|message| within_bulk_window(message.timestamp, now))
        .map(|message| message.id)
        .collect();

    match ids.as_slice() {
        [] => {}
        [single] => channel.delete_message(&ctx.http, *single).await?,
        many => channel.delete_messages(&ctx.http, many).await?,
    }
    Ok(ids.len())
}

pub async fn run(ctx: &Context, command: &CommandInteraction) -> Result<(), serenity::Error> {
    let Some(invoker) = command.member.as_deref() else {
        return respond_ephemeral(ctx, command, embeds::error("This command can only be used in a server.")).await;
    };
    let amount = match parse_amount(option(command, "amount").and_then(|value| value.as_i64())) {
        Ok(amount) => amount,
        Err(reason) => return respond_ephemeral(ctx, command, embeds::error(reason)).await,
    };

    let invoker_permissions = invoker.permissions.unwrap_or_else(Permissions::empty);
    if !has_permission(invoker_permissions, Permissions::MANAGE_MESSAGES) {
        return respond_ephemeral(ctx, command, embeds::error("You do not have permission to manage messages.")).await;
    }
    let bot_permissions = command.app_permissions.unwrap_or_else(Permissions::empty);
    if !has_permission(bot_permissions, Permissions::MANAGE_MESSAGES) {
        return respond_ephemeral(ctx, command, embeds::error("I do not have permission to manage messages.")).await;
    }

    command.defer_ephemeral(&ctx.http).await?;

    let embed = match delete_recent(ctx, command.channel_id, amount).await {
        Ok(deleted) => {
            info!("{} cleared {} messages in {}", command.user.tag(), deleted, command.channel_id);
            embeds::success("🧹 Messages Cleared")
                .description(format!("Successfully deleted **{}** messages.", deleted))
                .field("Channel", format!("<#{}>", command.channel_id), true)
                .field("Cleared by", command.user.tag(), true)
        }
        Err(why) => {
            error!("Error clearing messages in {}: {}", command.channel_id, why);
            embeds::error("Failed to clear messages. Messages older than 14 days cannot be deleted.")
        }
    };

    command.edit_response(&ctx.http, EditInteractionResponse::new().embed(embed)).await?;
    Ok(())
}
