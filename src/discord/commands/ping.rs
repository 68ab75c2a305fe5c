// src/discord/commands/ping.rs
use serenity::builder::{CreateCommand, EditInteractionResponse};
use serenity::model::prelude::*;
use serenity::prelude::*;
use std::time::{Duration, Instant};
use crate::discord::{embeds, ShardManagerContainer};
use super::CommandSpec;

pub fn register(spec: &CommandSpec) -> CreateCommand {
    CreateCommand::new(spec.name).description(spec.description)
}

/// Heartbeat latency is unknown until the shard has acked its first heartbeat.
pub fn format_latency(latency: Option<Duration>) -> String {
    match latency {
        Some(latency) => format!("`{}ms`", latency.as_millis()),
        None => "N/A".to_string(),
    }
}

async fn gateway_latency(ctx: &Context) -> Option<Duration> {
    let manager = ctx.data.read().await.get::<ShardManagerContainer>().cloned()?;
    let runners = manager.runners.lock().await;
    runners.get(&ctx.shard_id).and_then(|runner| runner.latency)
}

pub async fn run(ctx: &Context, command: &CommandInteraction) -> Result<(), serenity::Error> {
    let started = Instant::now();
    command.defer(&ctx.http).await?;
    let round_trip = started.elapsed().as_millis();

    let embed = embeds::info("🏓 Pong!")
        .field("Bot Latency", format!("`{}ms`", round_trip), true)
        .field("API Latency", format_latency(gateway_latency(ctx).await), true);

    command.edit_response(&ctx.http, EditInteractionResponse::new().embed(embed)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_formats_millis_or_placeholder() {
        assert_eq!(format_latency(Some(Duration::from_millis(42))), "`42ms`");
        assert_eq!(format_latency(Some(Duration::from_micros(1_500))), "`1ms`");
        assert_eq!(format_latency(None), "N/A");
    }
}
