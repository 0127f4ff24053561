use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use twilight_cache_inmemory::InMemoryCache;
use twilight_http::Client as DiscordHttp;
use twilight_http::error::ErrorType;
use twilight_model::channel::message::Embed;
use twilight_model::channel::ChannelType;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};
use twilight_model::id::Id;
use twilight_model::util::Timestamp;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};

use serverwatch_common::models::{DiscordEmbed, DisplayPayload, MessageHandle};

use crate::platforms::StatusChannel;
use crate::Error;

/// Channel kinds that accept regular messages.
pub fn is_text_channel(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::GuildText
            | ChannelType::GuildAnnouncement
            | ChannelType::GuildVoice
            | ChannelType::GuildStageVoice
            | ChannelType::PublicThread
            | ChannelType::PrivateThread
            | ChannelType::AnnouncementThread
    )
}

pub fn to_twilight_embed(embed: &DiscordEmbed) -> Embed {
    let mut builder = EmbedBuilder::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title.clone());
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description.clone());
    }
    if let Some(color) = embed.color {
        builder = builder.color(color.0);
    }
    for field in &embed.fields {
        let mut fb = EmbedFieldBuilder::new(field.name.clone(), field.value.clone());
        if field.inline {
            fb = fb.inline();
        }
        builder = builder.field(fb);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(EmbedFooterBuilder::new(footer.text.clone()));
    }
    if let Some(ts) = embed
        .timestamp
        .and_then(|t| Timestamp::from_micros(t.timestamp_micros()).ok())
    {
        builder = builder.timestamp(ts);
    }
    builder.build()
}

/// How a failed REST lookup should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailure {
    /// The resource is gone; a message handle pointing at it is stale.
    Missing,
    /// Anything else: auth, rate limit, server error, transport.
    Failed,
}

pub fn classify_status(status: u16) -> LookupFailure {
    if status == 404 {
        LookupFailure::Missing
    } else {
        LookupFailure::Failed
    }
}

fn classify(err: &twilight_http::Error) -> LookupFailure {
    match err.kind() {
        ErrorType::Response { status, .. } => classify_status(status.get()),
        _ => LookupFailure::Failed,
    }
}

fn is_not_found(err: &twilight_http::Error) -> bool {
    classify(err) == LookupFailure::Missing
}

/// Publishes into one fixed channel through the Discord REST API.
pub struct DiscordStatusChannel {
    http: Arc<DiscordHttp>,
    cache: Arc<InMemoryCache>,
    channel_id: Id<ChannelMarker>,
}

impl DiscordStatusChannel {
    pub fn new(
        http: Arc<DiscordHttp>,
        cache: Arc<InMemoryCache>,
        channel_id: u64,
    ) -> Result<Self, Error> {
        let channel_id = Id::<ChannelMarker>::new_checked(channel_id)
            .ok_or_else(|| Error::Platform(format!("Invalid channel ID: {channel_id}")))?;
        Ok(Self { http, cache, channel_id })
    }

    fn message_id(handle: MessageHandle) -> Result<Id<MessageMarker>, Error> {
        Id::<MessageMarker>::new_checked(handle.get())
            .ok_or_else(|| Error::Platform(format!("Invalid message ID: {handle}")))
    }

    fn check_kind(&self, kind: ChannelType) -> Result<(), Error> {
        if is_text_channel(kind) {
            Ok(())
        } else {
            Err(Error::Platform(format!(
                "Channel {} is not a text channel (kind={kind:?})",
                self.channel_id
            )))
        }
    }
}

#[async_trait]
impl StatusChannel for DiscordStatusChannel {
    async fn resolve_channel(&self) -> Result<(), Error> {
        let cached_kind = self.cache.channel(self.channel_id).map(|ch| ch.kind);
        if let Some(kind) = cached_kind {
            return self.check_kind(kind);
        }

        debug!("Channel {} not cached; asking the API", self.channel_id);
        let channel = self.http.channel(self.channel_id).await
            .map_err(|e| {
                if is_not_found(&e) {
                    Error::NotFound(format!("Could not find text channel with ID {}", self.channel_id))
                } else {
                    Error::Platform(format!("Error fetching channel => {e}"))
                }
            })?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing channel => {e}")))?;
        self.check_kind(channel.kind)
    }

    async fn create_message(&self, payload: &DisplayPayload) -> Result<MessageHandle, Error> {
        let embeds = [to_twilight_embed(&payload.embed)];
        let message = self.http
            .create_message(self.channel_id)
            .content(&payload.short_text)
            .embeds(&embeds)
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord message: {e:?}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing sent message: {e}")))?;
        Ok(MessageHandle(message.id.get()))
    }

    async fn find_message(&self, handle: MessageHandle) -> Result<Option<MessageHandle>, Error> {
        let message_id = Self::message_id(handle)?;
        match self.http.message(self.channel_id, message_id).await {
            Ok(resp) => {
                let message = resp
                    .model()
                    .await
                    .map_err(|e| Error::Platform(format!("Error parsing message {handle}: {e}")))?;
                Ok(Some(MessageHandle(message.id.get())))
            }
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(Error::Platform(format!("Error fetching message {handle}: {e:?}"))),
        }
    }

    async fn edit_message(&self, handle: MessageHandle, payload: &DisplayPayload) -> Result<(), Error> {
        let message_id = Self::message_id(handle)?;
        let embeds = [to_twilight_embed(&payload.embed)];
        self.http
            .update_message(self.channel_id, message_id)
            .content(Some(payload.short_text.as_str()))
            .embeds(Some(&embeds[..]))
            .await
            .map_err(|e| Error::Platform(format!("Error editing Discord message: {e:?}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::render::render_at;
    use chrono::{TimeZone, Utc};
    use serverwatch_common::models::{StatusRecord, StatusReport};

    #[test]
    fn text_kinds() {
        assert!(is_text_channel(ChannelType::GuildText));
        assert!(is_text_channel(ChannelType::GuildAnnouncement));
        assert!(is_text_channel(ChannelType::PublicThread));
        assert!(!is_text_channel(ChannelType::GuildCategory));
        assert!(!is_text_channel(ChannelType::GuildForum));
        assert!(!is_text_channel(ChannelType::Private));
    }

    #[test]
    fn only_404_marks_a_message_missing() {
        assert_eq!(classify_status(404), LookupFailure::Missing);
        for status in [400, 401, 403, 429, 500, 502, 503] {
            assert_eq!(classify_status(status), LookupFailure::Failed, "status {status}");
        }
    }

    #[test]
    fn payload_maps_onto_embed() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let report = StatusReport::Online(StatusRecord {
            address: "1.2.3.4:27015".into(),
            name: "Test Server".into(),
            players: 5,
            max_players: 10,
            secure: true,
        });
        let payload = render_at(&report, now);
        let embed = to_twilight_embed(&payload.embed);

        assert_eq!(embed.title.as_deref(), Some("🎮 Test Server"));
        assert_eq!(embed.color, Some(0x2ECC71));
        assert_eq!(embed.fields.len(), 3);
        assert_eq!(embed.fields[0].name, "Players");
        assert_eq!(embed.fields[0].value, "5 / 10");
        assert!(embed.fields.iter().all(|f| f.inline));
        assert_eq!(
            embed.footer.as_ref().map(|f| f.text.as_str()),
            Some("Last Updated: 03:04:05 UTC")
        );
        assert_eq!(embed.timestamp.map(|t| t.as_secs()), Some(now.timestamp()));
    }

    #[test]
    fn error_payload_has_no_fields() {
        let payload = render_at(&StatusReport::fetch_error("boom"), Utc::now());
        let embed = to_twilight_embed(&payload.embed);
        assert!(embed.fields.is_empty());
        assert!(embed.footer.is_none());
        assert_eq!(embed.color, Some(0xE74C3C));
    }
}
