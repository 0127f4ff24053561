pub mod runtime;
pub mod channel;

pub use runtime::{ConnectionStatus, DiscordPlatform, GatewayEvent};
pub use channel::{classify_status, is_text_channel, to_twilight_embed, DiscordStatusChannel, LookupFailure};
