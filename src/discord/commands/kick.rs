// src/discord/commands/kick.rs
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use serenity::model::prelude::*;
use serenity::prelude::*;
use std::collections::HashMap;
use log::{error, info};
use crate::discord::embeds;
use super::{has_permission, option, respond_ephemeral, CommandSpec};

const NO_REASON: &str = "No reason provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickRefusal {
    KickSelf,
    KickBot,
    MissingUserPermission,
    MissingBotPermission,
    TargetIsOwner,
    OutranksInvoker,
    OutranksBot,
}

impl KickRefusal {
    pub fn message(self) -> &'static str {
        match self {
            KickRefusal::KickSelf => "You cannot kick yourself!",
            KickRefusal::KickBot => "You cannot kick me!",
            KickRefusal::MissingUserPermission => "You do not have permission to kick members.",
            KickRefusal::MissingBotPermission => "I do not have permission to kick members.",
            KickRefusal::TargetIsOwner => "The server owner cannot be kicked.",
            KickRefusal::OutranksInvoker => "You cannot kick this user due to role hierarchy.",
            KickRefusal::OutranksBot => "I cannot kick this user because their highest role is above mine.",
        }
    }
}

/// Everything needed to decide whether a kick may go ahead.
#[derive(Debug, Clone)]
pub struct KickCheck {
    pub invoker: UserId,
    pub target: UserId,
    pub bot: UserId,
    pub guild_owner: UserId,
    pub invoker_permissions: Permissions,
    pub bot_permissions: Permissions,
    pub invoker_top_role: u16,
    pub target_top_role: u16,
    pub bot_top_role: u16,
}

impl KickCheck {
    pub fn evaluate(&self) -> Result<(), KickRefusal> {
        if self.target == self.invoker {
            return Err(KickRefusal::KickSelf);
        }
        if self.target == self.bot {
            return Err(KickRefusal::KickBot);
        }
        if !has_permission(self.invoker_permissions, Permissions::KICK_MEMBERS) {
            return Err(KickRefusal::MissingUserPermission);
        }
        if !has_permission(self.bot_permissions, Permissions::KICK_MEMBERS) {
            return Err(KickRefusal::MissingBotPermission);
        }
        if self.target == self.guild_owner {
            return Err(KickRefusal::TargetIsOwner);
        }
        let invoker_exempt = self.invoker == self.guild_owner || self.invoker_permissions.administrator();
        if !invoker_exempt && self.invoker_top_role <= self.target_top_role {
            return Err(KickRefusal::OutranksInvoker);
        }
        if self.bot_top_role <= self.target_top_role {
            return Err(KickRefusal::OutranksBot);
        }
        Ok(())
    }
}

/// Position of the member's highest role; 0 (the @everyone position) when they have none.
pub fn top_role_position(positions: &HashMap<RoleId, u16>, member_roles: &[RoleId]) -> u16 {
    member_roles
        .iter()
        .filter_map(|role| positions.get(role).copied())
        .max()
        .unwrap_or(0)
}

pub fn register(spec: &CommandSpec) -> CreateCommand {
    CreateCommand::new(spec.name)
        .description(spec.description)
        .default_member_permissions(Permissions::KICK_MEMBERS)
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "The user to kick")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "reason", "Reason for kicking the user")
                .required(false),
        )
}

pub async fn run(ctx: &Context, command: &CommandInteraction) -> Result<(), serenity::Error> {
    let (Some(guild_id), Some(invoker)) = (command.guild_id, command.member.as_deref()) else {
        return respond_ephemeral(ctx, command, embeds::error("This command can only be used in a server.")).await;
    };
    let Some(target) = option(command, "user").and_then(|value| value.as_user_id()) else {
        return respond_ephemeral(ctx, command, embeds::error("Please specify a user to kick.")).await;
    };
    let reason = option(command, "reason")
        .and_then(|value| value.as_str())
        .filter(|reason| !reason.is_empty())
        .unwrap_or(NO_REASON)
        .to_string();
    let bot_id = ctx.cache.current_user().id;

    let target_member = match guild_id.member(&ctx.http, target).await {
        Ok(member) => member,
        Err(_) => {
            return respond_ephemeral(ctx, command, embeds::error("That user is not a member of this server.")).await;
        }
    };
    let bot_member = guild_id.member(&ctx.http, bot_id).await?;
    let owner_id = guild_id.to_partial_guild(&ctx.http).await?.owner_id;
    let positions: HashMap<RoleId, u16> = guild_id
        .roles(&ctx.http)
        .await?
        .into_iter()
        .map(|(id, role)| (id, role.position))
        .collect();

    let check = KickCheck {
        invoker: command.user.id,
        target,
        bot: bot_id,
        guild_owner: owner_id,
        invoker_permissions: invoker.permissions.unwrap_or_else(Permissions::empty),
        bot_permissions: command.app_permissions.unwrap_or_else(Permissions::empty),
        invoker_top_role: top_role_position(&positions, &invoker.roles),
        target_top_role: top_role_position(&positions, &target_member.roles),
        bot_top_role: top_role_position(&positions, &bot_member.roles),
    };
    if let Err(refusal) = check.evaluate() {
        return respond_ephemeral(ctx, command, embeds::error(refusal.message())).await;
    }

    if let Err(why) = guild_id.kick_with_reason(&ctx.http, target, &reason).await {
        error!("Error kicking user {}: {}", target, why);
        return respond_ephemeral(
            ctx,
            command,
            embeds::error("Failed to kick the user. Please check my permissions and try again."),
        )
        .await;
    }
    info!("{} kicked {} from {}: {}", command.user.tag(), target_member.user.tag(), guild_id, reason);

    let embed = embeds::success("👢 User Kicked")
        .thumbnail(target_member.user.face())
        .field("User", format!("{} ({})", target_member.user.tag(), target), true)
        .field("Kicked by", command.user.tag(), true)
        .field("Reason", reason, false);

    command.create_response(&ctx.http, CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new().embed(embed)
    )).await
}
