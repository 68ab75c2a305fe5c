// src/discord/commands/mod.rs
pub mod clear;
pub mod cooldowns;
pub mod help;
pub mod info;
pub mod kick;
pub mod ping;

use serenity::builder::{
    CreateCommand, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use serenity::model::prelude::*;
use serenity::prelude::*;
use crate::cooldown::{Clock, CooldownCheck, CooldownError, CooldownTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ping,
    Help,
    Info,
    Kick,
    Clear,
    Cooldowns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    General,
    Moderation,
    Dev,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Moderation => "Moderation",
            Category::Dev => "Dev",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::General => "🔧",
            Category::Moderation => "🛡️",
            Category::Dev => "⚙️",
        }
    }
}

pub struct CommandSpec {
    pub name: &'static str,
    pub kind: CommandKind,
    pub category: Category,
    pub description: &'static str,
    /// Seconds; `None` falls back to the configured default.
    pub cooldown: Option<u64>,
    pub owner_only: bool,
}

impl CommandSpec {
    pub fn cooldown_or(&self, default: u64) -> u64 {
        self.cooldown.unwrap_or(default)
    }

    pub fn register(&self) -> CreateCommand {
        match self.kind {
            CommandKind::Ping => ping::register(self),
            CommandKind::Help => help::register(self),
            CommandKind::Info => info::register(self),
            CommandKind::Kick => kick::register(self),
            CommandKind::Clear => clear::register(self),
            CommandKind::Cooldowns => cooldowns::register(self),
        }
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "ping",
        kind: CommandKind::Ping,
        category: Category::General,
        description: "Check the bot's latency",
        cooldown: Some(3),
        owner_only: false,
    },
    CommandSpec {
        name: "help",
        kind: CommandKind::Help,
        category: Category::General,
        description: "Display all available commands",
        cooldown: Some(3),
        owner_only: false,
    },
    CommandSpec {
        name: "info",
        kind: CommandKind::Info,
        category: Category::General,
        description: "Display bot and server information",
        cooldown: Some(5),
        owner_only: false,
    },
    CommandSpec {
        name: "kick",
        kind: CommandKind::Kick,
        category: Category::Moderation,
        description: "Kick a user from the server",
        cooldown: Some(5),
        owner_only: false,
    },
    CommandSpec {
        name: "clear",
        kind: CommandKind::Clear,
        category: Category::Moderation,
        description: "Clear a specified number of messages",
        cooldown: Some(5),
        owner_only: false,
    },
    CommandSpec {
        name: "cooldowns",
        kind: CommandKind::Cooldowns,
        category: Category::Dev,
        description: "Inspect or reset command cooldowns",
        cooldown: None,
        owner_only: true,
    },
];

pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

pub fn register_all() -> Vec<CreateCommand> {
    COMMANDS.iter().map(CommandSpec::register).collect()
}

/// Runs the cooldown gate for `user_id` on `spec`, returning the notice to
/// show when the user has to wait.
pub fn cooldown_gate<C: Clock>(
    tracker: &CooldownTracker<C>,
    user_id: &str,
    spec: &CommandSpec,
    default_cooldown: u64,
) -> Result<Option<String>, CooldownError> {
    let CooldownCheck { on_cooldown, formatted_remaining, .. } =
        tracker.check_and_apply(user_id, spec.name, spec.cooldown_or(default_cooldown))?;

    Ok(match (on_cooldown, formatted_remaining) {
        (true, Some(remaining)) => Some(cooldown_notice(&remaining)),
        _ => None,
    })
}

pub fn cooldown_notice(remaining: &str) -> String {
    format!("Please wait **{}** before using this command again.", remaining)
}

/// Value of a top-level option, by name.
pub fn option<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a CommandDataOptionValue> {
    command
        .data
        .options
        .iter()
        .find(|option| option.name == name)
        .map(|option| &option.value)
}

/// Administrator implies every other permission.
pub fn has_permission(granted: Permissions, needed: Permissions) -> bool {
    granted.administrator() || granted.contains(needed)
}

/// Initial response visible only to the invoking user.
pub async fn respond_ephemeral(ctx: &Context, command: &CommandInteraction, embed: CreateEmbed) -> Result<(), serenity::Error> {
    command.create_response(&ctx.http, CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(embed)
            .ephemeral(true)
    )).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::ManualClock;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn registry_names_are_unique_and_findable() {
        let names: HashSet<_> = COMMANDS.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), COMMANDS.len());
        for spec in COMMANDS {
            assert_eq!(find(spec.name).map(|c| c.kind), Some(spec.kind));
        }
        assert!(find("eval").is_none());
    }

    #[test]
    fn missing_cooldown_uses_default() {
        let spec = find("cooldowns").unwrap();
        assert_eq!(spec.cooldown_or(3), 3);
        assert_eq!(find("info").unwrap().cooldown_or(3), 5);
    }

    #[test]
    fn moderation_commands_use_five_second_cooldown() {
        for name in ["kick", "clear"] {
            let spec = find(name).unwrap();
            assert_eq!(spec.category, Category::Moderation);
            assert_eq!(spec.cooldown_or(3), 5);
            assert!(!spec.owner_only);
        }
        assert_eq!(find("kick").unwrap().kind, CommandKind::Kick);
        assert_eq!(find("clear").unwrap().kind, CommandKind::Clear);
    }

    #[test]
    fn administrator_implies_any_permission() {
        assert!(has_permission(Permissions::ADMINISTRATOR, Permissions::KICK_MEMBERS));
        assert!(has_permission(
            Permissions::KICK_MEMBERS | Permissions::SEND_MESSAGES,
            Permissions::KICK_MEMBERS
        ));
        assert!(!has_permission(Permissions::MANAGE_MESSAGES, Permissions::KICK_MEMBERS));
        assert!(!has_permission(Permissions::empty(), Permissions::MANAGE_MESSAGES));
    }

    #[test]
    fn gate_reports_wait_on_second_use() {
        let clock = ManualClock::new(0);
        let tracker = CooldownTracker::with_clock(clock.clone());
        let info = find("info").unwrap();

        assert_eq!(cooldown_gate(&tracker, "42", info, 3).unwrap(), None);

        clock.advance(Duration::from_secs(1));
        assert_eq!(
            cooldown_gate(&tracker, "42", info, 3).unwrap().as_deref(),
            Some("Please wait **4 seconds** before using this command again.")
        );

        clock.advance(Duration::from_secs(4));
        assert_eq!(cooldown_gate(&tracker, "42", info, 3).unwrap(), None);
    }

    #[test]
    fn commands_do_not_share_a_window() {
        let tracker = CooldownTracker::with_clock(ManualClock::new(0));
        assert!(cooldown_gate(&tracker, "42", find("ping").unwrap(), 3).unwrap().is_none());
        assert!(cooldown_gate(&tracker, "42", find("help").unwrap(), 3).unwrap().is_none());
        assert!(cooldown_gate(&tracker, "7", find("ping").unwrap(), 3).unwrap().is_none());
    }
}
