// serverwatch-core/src/config.rs

use std::env;
use std::time::Duration;

use crate::Error;

pub const DEFAULT_STEAM_API_URL: &str =
    "https://api.steampowered.com/IGameServersService/GetServerList/v1/";
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 2;

/// Everything the bot needs at startup. Secrets never get a default.
#[derive(Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub channel_id: u64,
    pub steam_api_key: String,
    pub steam_api_url: String,
    pub server_address: String,
    pub server_port: u16,
    pub update_interval: Duration,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("steam_api_key", &"<redacted>")
            .field("steam_api_url", &self.steam_api_url)
            .field("server_address", &self.server_address)
            .field("server_port", &self.server_port)
            .field("update_interval", &self.update_interval)
            .finish()
    }
}

impl BotConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, Error> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{key} must be set")))
        };

        let discord_token = required("DISCORD_TOKEN")?;

        let channel_raw = required("DISCORD_CHANNEL_ID")?;
        let channel_id = channel_raw
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| {
                Error::Config(format!("DISCORD_CHANNEL_ID must be a non-zero integer, got '{channel_raw}'"))
            })?;

        let steam_api_key = required("STEAM_API_KEY")?;
        let server_address = required("SERVER_ADDRESS")?;

        let port_raw = required("SERVER_PORT")?;
        let server_port = port_raw
            .parse::<u16>()
            .map_err(|e| Error::Config(format!("SERVER_PORT '{port_raw}': {e}")))?;

        let update_interval_secs = match lookup("UPDATE_INTERVAL_SECS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("UPDATE_INTERVAL_SECS '{raw}': {e}")))?,
            _ => DEFAULT_UPDATE_INTERVAL_SECS,
        };
        if update_interval_secs == 0 {
            return Err(Error::Config("UPDATE_INTERVAL_SECS must be at least 1".into()));
        }

        let steam_api_url = lookup("STEAM_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_STEAM_API_URL.to_string());

        Ok(Self {
            discord_token,
            channel_id,
            steam_api_key,
            steam_api_url,
            server_address,
            server_port,
            update_interval: Duration::from_secs(update_interval_secs),
        })
    }
}
