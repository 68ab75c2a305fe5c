// src/discord/mod.rs
mod client;
mod events;
pub mod commands;
pub mod embeds;
mod presence;
pub use client::{DiscordClient, ShardManagerContainer};
