// File: serverwatch-common/src/models/mod.rs
pub mod status;
pub mod discord;
pub mod payload;

pub use status::{StatusRecord, StatusReport, ServerListResponse, MAX_DIAGNOSTIC_CHARS};
pub use discord::{DiscordColor, DiscordEmbed, DiscordEmbedField, DiscordEmbedFooter, MessageHandle};
pub use payload::{ColorTag, DisplayPayload};
