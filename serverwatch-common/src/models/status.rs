use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Diagnostics shown in an error payload are cut to this many characters.
pub const MAX_DIAGNOSTIC_CHARS: usize = 200;

/// One game server entry as returned by `IGameServersService/GetServerList`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusRecord {
    #[serde(rename = "addr")]
    pub address: String,
    pub name: String,
    pub players: i32,
    pub max_players: i32,
    pub secure: bool,
}

/// Top-level envelope: `{ "response": { "servers": [ ... ] } }`.
///
/// Both levels are optional on the wire; a missing level is read as "no servers".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerListResponse {
    #[serde(default)]
    pub response: Option<ServerList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerList {
    #[serde(default)]
    pub servers: Option<Vec<StatusRecord>>,
}

impl ServerListResponse {
    /// Only the first entry is ever consumed.
    pub fn into_first(self) -> Option<StatusRecord> {
        self.response
            .and_then(|r| r.servers)
            .and_then(|servers| servers.into_iter().next())
    }
}

/// Result of a single status fetch, as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    Online(StatusRecord),
    NotFound,
    FetchError(String),
}

impl StatusReport {
    pub fn fetch_error(message: &str) -> Self {
        StatusReport::FetchError(truncate_chars(message, MAX_DIAGNOSTIC_CHARS))
    }
}

impl From<Result<Option<StatusRecord>, Error>> for StatusReport {
    fn from(result: Result<Option<StatusRecord>, Error>) -> Self {
        match result {
            Ok(Some(record)) => StatusReport::Online(record),
            Ok(None) => StatusReport::NotFound,
            Err(e) => StatusReport::fetch_error(&e.to_string()),
        }
    }
}

/// Cuts on char boundaries, never inside a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
