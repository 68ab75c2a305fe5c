use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::Timestamp;

pub const COLOR_PRIMARY: u32 = 0x2f3136;
pub const COLOR_SECONDARY: u32 = 0x57f287;
pub const COLOR_SUCCESS: u32 = 0x57f287;
pub const COLOR_ERROR: u32 = 0xed4245;
pub const COLOR_WARNING: u32 = 0xfaa61a;

pub const FOOTER_TEXT: &str = "Vazha Bot • Powered by serenity";

/// Embed with the bot's footer and the current timestamp.
pub fn base(color: u32) -> CreateEmbed {
    CreateEmbed::new()
        .colour(color)
        .footer(CreateEmbedFooter::new(FOOTER_TEXT))
        .timestamp(Timestamp::now())
}

pub fn info(title: impl Into<String>) -> CreateEmbed {
    base(COLOR_SECONDARY).title(title)
}

pub fn success(title: impl Into<String>) -> CreateEmbed {
    base(COLOR_SUCCESS).title(title)
}

pub fn error(description: impl Into<String>) -> CreateEmbed {
    base(COLOR_ERROR).title("❌ Error").description(description)
}

pub fn warning(title: impl Into<String>) -> CreateEmbed {
    base(COLOR_WARNING).title(title)
}

pub fn cooldown(notice: impl Into<String>) -> CreateEmbed {
    warning("⏰ Cooldown Active").description(notice)
}

/// Discord `<t:..:R>` markup, rendered client-side as "3 years ago".
pub fn relative_timestamp(at: Timestamp) -> String {
    format!("<t:{}:R>", at.unix_timestamp())
}
