use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the status message currently shown in the target channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle(pub u64);

impl MessageHandle {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordColor(pub u32);

impl DiscordColor {
    pub const GREEN: DiscordColor = DiscordColor(0x2ECC71);
    pub const LIGHT_GREY: DiscordColor = DiscordColor(0x979C9F);
    pub const ORANGE: DiscordColor = DiscordColor(0xE67E22);
    pub const RED: DiscordColor = DiscordColor(0xE74C3C);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordEmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordEmbedFooter {
    pub text: String,
}

/// Platform-neutral embed; converted to the twilight model right before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<DiscordColor>,
    pub fields: Vec<DiscordEmbedField>,
    pub footer: Option<DiscordEmbedFooter>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DiscordEmbed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inline_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(DiscordEmbedField {
            name: name.into(),
            value: value.into(),
            inline: true,
        });
        self
    }

    /// Value of the first field named `name`, if any.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
