use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::{info, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    ERROR,
    WARN,
    #[default]
    INFO,
    DEBUG,
    VERBOSE,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::ERROR => LevelFilter::Error,
            LogLevel::WARN => LevelFilter::Warn,
            LogLevel::INFO => LevelFilter::Info,
            LogLevel::DEBUG => LevelFilter::Debug,
            LogLevel::VERBOSE => LevelFilter::Trace,
        }
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn plain_format(out: fern::FormatCallback, message: &fmt::Arguments, record: &log::Record) {
    out.finish(format_args!(
        "{} [{}] {}: {}",
        Local::now().format(TIMESTAMP_FORMAT),
        record.level(),
        record.target(),
        message
    ))
}

/// Installs the global logger: colored console output, plus `combined.log`
/// and `error.log` under `log_dir` when one is given.
pub fn init(level: LogLevel, log_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                Local::now().format(TIMESTAMP_FORMAT),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stdout());

    let mut root = fern::Dispatch::new()
        .level(level.as_filter())
        // serenity and its http stack are chatty below warn
        .level_for("serenity", LevelFilter::Warn)
        .chain(console);

    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)?;
        root = root
            .chain(
                fern::Dispatch::new()
                    .format(plain_format)
                    .chain(fern::log_file(dir.join("combined.log"))?),
            )
            .chain(
                fern::Dispatch::new()
                    .level(LevelFilter::Error)
                    .format(plain_format)
                    .chain(fern::log_file(dir.join("error.log"))?),
            );
    }

    root.apply()?;
    Ok(())
}

/// One line per executed command.
pub fn log_command(command: &str, user: &str, guild: Option<&str>) {
    info!(
        "Command executed: {} by {} in {}",
        command,
        user,
        guild.unwrap_or("DM")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_filters() {
        assert_eq!(LogLevel::ERROR.as_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::INFO.as_filter(), LevelFilter::Info);
        assert_eq!(LogLevel::VERBOSE.as_filter(), LevelFilter::Trace);
    }

    #[test]
    fn levels_order_by_verbosity() {
        assert!(LogLevel::ERROR < LogLevel::WARN);
        assert!(LogLevel::DEBUG < LogLevel::VERBOSE);
        assert_eq!(LogLevel::default(), LogLevel::INFO);
    }
}
