// src/discord/commands/cooldowns.rs
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use serenity::model::prelude::*;
use serenity::prelude::*;
use log::info;
use crate::cooldown::{Clock, CooldownTracker};
use crate::discord::embeds;
use super::{option, CommandSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Stats,
    ClearUser(UserId),
    ClearAll,
}

impl AdminAction {
    pub fn parse(action: &str, user: Option<UserId>) -> Result<Self, &'static str> {
        match (action, user) {
            ("stats", _) => Ok(AdminAction::Stats),
            ("clear_user", Some(user)) => Ok(AdminAction::ClearUser(user)),
            ("clear_user", None) => Err("`clear_user` needs a `user`."),
            ("clear_all", _) => Ok(AdminAction::ClearAll),
            _ => Err("Unknown action."),
        }
    }

    /// Applies the action and returns `(title, description)` for the reply.
    pub fn apply<C: Clock>(self, tracker: &CooldownTracker<C>) -> (String, String) {
        match self {
            AdminAction::Stats => {
                let stats = tracker.stats();
                (
                    "📊 Cooldown Statistics".to_string(),
                    format!(
                        "Total: **{}**\nActive: **{}**\nExpired (removed): **{}**",
                        stats.total, stats.active, stats.expired
                    ),
                )
            }
            AdminAction::ClearUser(user) => {
                tracker.clear_all(&user.to_string());
                info!("Cleared cooldowns for user {}", user);
                ("✅ Confirmation".to_string(), format!("Cleared all cooldowns for <@{}>", user))
            }
            AdminAction::ClearAll => {
                tracker.clear_everything();
                info!("Cleared every cooldown");
                ("✅ Confirmation".to_string(), "Cleared every cooldown".to_string())
            }
        }
    }
}

pub fn register(spec: &CommandSpec) -> CreateCommand {
    CreateCommand::new(spec.name)
        .description(spec.description)
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "action", "What to do")
                .required(true)
                .add_string_choice("stats", "stats")
                .add_string_choice("clear_user", "clear_user")
                .add_string_choice("clear_all", "clear_all"),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "User whose cooldowns to clear")
                .required(false),
        )
}

pub async fn run<C: Clock>(
    ctx: &Context,
    command: &CommandInteraction,
    tracker: &CooldownTracker<C>,
) -> Result<(), serenity::Error> {
    let action = option(command, "action").and_then(|value| value.as_str()).unwrap_or_default();
    let user = option(command, "user").and_then(|value| value.as_user_id());

    let message = match AdminAction::parse(action, user) {
        Ok(action) => {
            let (title, description) = action.apply(tracker);
            let embed = match action {
                AdminAction::Stats => embeds::info(title),
                _ => embeds::success(title),
            };
            CreateInteractionResponseMessage::new()
                .embed(embed.description(description))
                .ephemeral(true)
        }
        Err(reason) => CreateInteractionResponseMessage::new().embed(embeds::error(reason)).ephemeral(true),
    };

    command.create_response(&ctx.http, CreateInteractionResponse::Message(message)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::ManualClock;
    use std::time::Duration;

    #[test]
    fn parses_actions() {
        let user = UserId::new(42);
        assert_eq!(AdminAction::parse("stats", None), Ok(AdminAction::Stats));
        assert_eq!(AdminAction::parse("clear_user", Some(user)), Ok(AdminAction::ClearUser(user)));
        assert!(AdminAction::parse("clear_user", None).is_err());
        assert_eq!(AdminAction::parse("clear_all", Some(user)), Ok(AdminAction::ClearAll));
        assert!(AdminAction::parse("reboot", None).is_err());
    }

    #[test]
    fn clear_user_leaves_other_users_alone() {
        let tracker = CooldownTracker::with_clock(ManualClock::new(0));
        tracker.grant("42", "ping", 30).unwrap();
        tracker.grant("42", "info", 30).unwrap();
        tracker.grant("7", "ping", 30).unwrap();

        AdminAction::ClearUser(UserId::new(42)).apply(&tracker);

        assert!(!tracker.is_on_cooldown("42", "ping").unwrap());
        assert!(!tracker.is_on_cooldown("42", "info").unwrap());
        assert!(tracker.is_on_cooldown("7", "ping").unwrap());
    }

    #[test]
    fn stats_reports_counts() {
        let clock = ManualClock::new(0);
        let tracker = CooldownTracker::with_clock(clock.clone());
        tracker.grant("42", "ping", 3).unwrap();
        tracker.grant("7", "info", 30).unwrap();
        clock.advance(Duration::from_secs(4));

        let (_, description) = AdminAction::Stats.apply(&tracker);
        assert_eq!(description, "Total: **2**\nActive: **1**\nExpired (removed): **1**");
    }

    #[test]
    fn clear_all_empties_tracker() {
        let tracker = CooldownTracker::with_clock(ManualClock::new(0));
        tracker.grant("42", "ping", 30).unwrap();
        AdminAction::ClearAll.apply(&tracker);
        assert!(tracker.is_empty());
    }
}
