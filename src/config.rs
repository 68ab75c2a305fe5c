use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::logging::LogLevel;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Discord token not found in configuration")]
    MissingToken,
}

fn default_cooldown() -> u64 { 3 }
fn default_status_rotation_secs() -> u64 { 30 }
fn default_cooldown_sweep_secs() -> u64 { 60 }

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub discord_token: Option<String>,
    pub discord_guild_id: Option<String>,
    #[serde(default)]
    pub owner_ids: Vec<u64>,
    /// Cooldown in seconds for commands that don't set their own.
    #[serde(default = "default_cooldown")]
    pub default_cooldown: u64,
    #[serde(default)]
    pub log_level: LogLevel,
    pub log_dir: Option<String>,
    /// Seconds between presence changes; 0 turns rotation off.
    #[serde(default = "default_status_rotation_secs")]
    pub status_rotation_secs: u64,
    /// Seconds between cooldown sweeps; 0 leaves cleanup to lazy expiry.
    #[serde(default = "default_cooldown_sweep_secs")]
    pub cooldown_sweep_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: None,
            discord_guild_id: None,
            owner_ids: Vec::new(),
            default_cooldown: default_cooldown(),
            log_level: LogLevel::default(),
            log_dir: None,
            status_rotation_secs: default_status_rotation_secs(),
            cooldown_sweep_secs: default_cooldown_sweep_secs(),
        }
    }
}

impl Config {
    const CONFIG_PATH: &'static str = "vazhabot.conf";

    pub fn new() -> Result<Self, ConfigError> {
        let mut config = if Path::new(Self::CONFIG_PATH).exists() {
            Self::load_from(Self::CONFIG_PATH)?
        } else {
            Self::initial_setup()?
        };
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(raw)?;
        // An empty token left by the setup prompt means "not set".
        if config.discord_token.as_deref().is_some_and(str::is_empty) {
            config.discord_token = None;
        }
        if config.discord_guild_id.as_deref().is_some_and(str::is_empty) {
            config.discord_guild_id = None;
        }
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(token) = env::var("DISCORD_TOKEN") {
            if !token.is_empty() {
                self.discord_token = Some(token);
            }
        }
        if let Ok(guild_id) = env::var("GUILD_ID") {
            if !guild_id.is_empty() {
                self.discord_guild_id = Some(guild_id);
            }
        }
    }

    fn initial_setup() -> Result<Self, ConfigError> {
        println!("{}", "Welcome to Vazha Bot! Let's set up your configuration.".bold());
        println!("1. Go to https://discord.com/developers/applications and create an application");
        println!("2. In the 'Bot' tab, click 'Reset Token' and copy the token");
        println!("3. Invite the bot with the 'bot' and 'applications.commands' scopes");
        println!("4. Enable Developer Mode in Discord and copy your server ID (optional)");

        let discord_token = Self::prompt_input("Enter your Discord Bot Token: ")?;
        let discord_guild_id = Self::prompt_input(
            "Enter the Discord Guild ID for command registration (leave empty to register globally): ",
        )?;

        let config = Config {
            discord_token: Some(discord_token).filter(|t| !t.is_empty()),
            discord_guild_id: Some(discord_guild_id).filter(|g| !g.is_empty()),
            ..Config::default()
        };

        config.save()?;
        println!("{}", "Configuration saved successfully!".green());

        Ok(config)
    }

    fn prompt_input(prompt: &str) -> Result<String, ConfigError> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::CONFIG_PATH)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), toml)?;
        log::info!("Config saved to: {:?}", path.as_ref());
        Ok(())
    }

    pub fn token(&self) -> Result<&str, ConfigError> {
        self.discord_token.as_deref().ok_or(ConfigError::MissingToken)
    }

    pub fn guild_id(&self) -> Option<u64> {
        self.discord_guild_id.as_deref().and_then(|id| id.parse::<u64>().ok())
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(PathBuf::from)
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }
}
