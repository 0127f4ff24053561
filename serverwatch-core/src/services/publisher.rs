//! Post-once-then-edit publishing of the status payload.
//!
//! The handle is passed in and handed back through [`PublishOutcome::next_handle`];
//! nothing here keeps state between calls.

use tracing::{error, info, warn};

use serverwatch_common::models::{DisplayPayload, MessageHandle};

use crate::platforms::StatusChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// No handle was held; a new message was posted.
    Created(MessageHandle),
    /// The held message was found and edited in place.
    Edited(MessageHandle),
    /// The held message could not be found; the handle is dropped.
    Stale(MessageHandle),
    /// Create, lookup or edit failed; the handle is dropped.
    Failed,
    /// The target channel did not resolve; the handle is kept as it was.
    ChannelUnavailable(Option<MessageHandle>),
}

impl PublishOutcome {
    pub fn next_handle(&self) -> Option<MessageHandle> {
        match *self {
            PublishOutcome::Created(h) | PublishOutcome::Edited(h) => Some(h),
            PublishOutcome::Stale(_) | PublishOutcome::Failed => None,
            PublishOutcome::ChannelUnavailable(prev) => prev,
        }
    }
}

pub async fn publish<C>(
    channel: &C,
    payload: &DisplayPayload,
    handle: Option<MessageHandle>,
) -> PublishOutcome
where
    C: StatusChannel + ?Sized,
{
    if let Err(e) = channel.resolve_channel().await {
        error!("Could not resolve target text channel: {e}");
        return PublishOutcome::ChannelUnavailable(handle);
    }

    let Some(current) = handle else {
        return match channel.create_message(payload).await {
            Ok(created) => {
                info!("Posted initial status message: {created}");
                PublishOutcome::Created(created)
            }
            Err(e) => {
                error!("Error posting status message: {e}");
                PublishOutcome::Failed
            }
        };
    };

    match channel.find_message(current).await {
        Ok(Some(found)) => match channel.edit_message(found, payload).await {
            Ok(()) => {
                info!("Updated message {found}: Status updated.");
                PublishOutcome::Edited(found)
            }
            Err(e) => {
                error!("Error updating message {found}: {e}");
                PublishOutcome::Failed
            }
        },
        Ok(None) => {
            warn!("Message {current} not found. Will post a new one next loop.");
            PublishOutcome::Stale(current)
        }
        Err(e) => {
            error!("Error looking up message {current}: {e}");
            PublishOutcome::Failed
        }
    }
}
