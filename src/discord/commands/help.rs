// src/discord/commands/help.rs
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::prelude::*;
use serenity::prelude::*;
use std::collections::BTreeMap;
use crate::cooldown::format_duration;
use crate::discord::embeds;
use super::{find, option, Category, CommandSpec, COMMANDS};

pub fn register(spec: &CommandSpec) -> CreateCommand {
    CreateCommand::new(spec.name)
        .description(spec.description)
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "command", "Get help for a specific command")
                .required(false),
        )
}

fn command_embed(spec: &CommandSpec, default_cooldown: u64) -> CreateEmbed {
    embeds::info(format!("📖 Help: {}", spec.name))
        .description(spec.description)
        .field("Category", spec.category.label(), true)
        .field("Cooldown", format_duration(spec.cooldown_or(default_cooldown)), true)
}

/// Command listing grouped by category, `(heading, body)` per group.
pub fn overview_sections() -> Vec<(String, String)> {
    let mut by_category: BTreeMap<Category, Vec<&CommandSpec>> = BTreeMap::new();
    for spec in COMMANDS {
        by_category.entry(spec.category).or_default().push(spec);
    }

    by_category
        .into_iter()
        .map(|(category, specs)| {
            let body = specs
                .iter()
                .map(|spec| format!("`{}` - {}", spec.name, spec.description))
                .collect::<Vec<_>>()
                .join("\n");
            (format!("{} {}", category.emoji(), category.label()), body)
        })
        .collect()
}

pub async fn run(ctx: &Context, command: &CommandInteraction, default_cooldown: u64) -> Result<(), serenity::Error> {
    let requested = option(command, "command").and_then(|value| value.as_str());

    let message = match requested {
        Some(name) => match find(name) {
            Some(spec) => CreateInteractionResponseMessage::new().embed(command_embed(spec, default_cooldown)),
            None => CreateInteractionResponseMessage::new()
                .embed(embeds::error(format!("Command `{}` not found.", name)))
                .ephemeral(true),
        },
        None => {
            let embed = overview_sections().into_iter().fold(
                embeds::base(embeds::COLOR_PRIMARY)
                    .title("📚 Help Menu")
                    .description("Here are all the available commands:"),
                |embed, (heading, body)| embed.field(heading, body, false),
            );
            CreateInteractionResponseMessage::new().embed(embed)
        }
    };

    command.create_response(&ctx.http, CreateInteractionResponse::Message(message)).await
}
