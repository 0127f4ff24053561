use serde::{Deserialize, Serialize};

use super::discord::DiscordEmbed;

/// Severity of what the payload shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorTag {
    Ok,
    Warn,
    Error,
}

/// Everything that goes into the status message: the plain text line plus the embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPayload {
    pub color_tag: ColorTag,
    pub short_text: String,
    pub embed: DiscordEmbed,
}

impl DisplayPayload {
    pub fn title(&self) -> &str {
        self.embed.title.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.embed.description.as_deref().unwrap_or_default()
    }
}
