// File: src/platforms/mod.rs

use async_trait::async_trait;

use serverwatch_common::models::{DisplayPayload, MessageHandle, StatusRecord};

use crate::Error;

/// Where status records come from.
///
/// `Ok(None)` means the API answered but listed no servers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<Option<StatusRecord>, Error>;
}

/// The chat channel the status message lives in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusChannel: Send + Sync {
    /// Fails when the configured channel id does not resolve to a usable text channel.
    async fn resolve_channel(&self) -> Result<(), Error>;
    async fn create_message(&self, payload: &DisplayPayload) -> Result<MessageHandle, Error>;
    /// `Ok(None)` when the platform reports the message as gone.
    async fn find_message(&self, handle: MessageHandle) -> Result<Option<MessageHandle>, Error>;
    async fn edit_message(&self, handle: MessageHandle, payload: &DisplayPayload) -> Result<(), Error>;
}

// Re-export submodules
pub mod steam;
pub mod discord;
