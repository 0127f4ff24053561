use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

use twilight_cache_inmemory::{InMemoryCache, ResourceType};
use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    Shard,
    MessageSender,
    StreamExt,
};
use twilight_http::Client as DiscordHttp;
use twilight_http::client::ClientBuilder;
use twilight_model::gateway::payload::incoming::Ready as ReadyPayload;

use super::channel::DiscordStatusChannel;
use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// What the gateway reports upward. Only readiness matters to the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Ready { shard_id: u32, user: String },
}

/// Runs one shard:
///   - calls `shard.next_event(...)`
///   - keeps the in-memory cache current (the target channel is looked up there)
///   - forwards READY to `tx`. A shard that reconnects sends READY again.
async fn shard_runner(
    mut shard: Shard,
    tx: UnboundedSender<GatewayEvent>,
    cache: Arc<InMemoryCache>,
) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        match item {
            Ok(event) => {
                cache.update(&event);

                match &event {
                    Event::Ready(ready) => {
                        let data: &ReadyPayload = ready.as_ref();
                        info!(
                            "Shard {shard_id} => READY as {}#{} (ID={})",
                            data.user.name, data.user.discriminator, data.user.id
                        );
                        let _ = tx.send(GatewayEvent::Ready {
                            shard_id,
                            user: data.user.name.clone(),
                        });
                    }
                    _ => {
                        trace!("Shard {shard_id} => unhandled event: {:?}", event.kind());
                    }
                }
            }
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

/// Holds the bot's gateway shards plus the REST client and cache they share.
pub struct DiscordPlatform {
    pub token: String,
    pub connection_status: ConnectionStatus,

    /// Set on `connect`; handed out once by `take_gateway_events`.
    rx: Option<UnboundedReceiver<GatewayEvent>>,

    pub shard_tasks: Vec<JoinHandle<()>>,
    pub shard_senders: Vec<MessageSender>,

    pub http: Option<Arc<DiscordHttp>>,
    pub cache: Option<Arc<InMemoryCache>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            rx: None,
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http: None,
            cache: None,
        }
    }

    /// Hands the gateway event stream to its single consumer. `None` before `connect`
    /// or once taken. The stream ends when every shard runner has stopped.
    pub fn take_gateway_events(&mut self) -> Option<UnboundedReceiver<GatewayEvent>> {
        self.rx.take()
    }

    /// Builds the publishing side for `channel_id` on top of this connection.
    pub fn status_channel(&self, channel_id: u64) -> Result<DiscordStatusChannel, Error> {
        let (Some(http), Some(cache)) = (&self.http, &self.cache) else {
            return Err(Error::Platform("Discord platform is not connected".into()));
        };
        DiscordStatusChannel::new(http.clone(), cache.clone(), channel_id)
    }

    pub async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }
        if self.token.is_empty() {
            return Err(Error::Platform("Discord token is empty".into()));
        }

        let (tx, rx) = unbounded_channel::<GatewayEvent>();
        self.rx = Some(rx);

        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build()
        );
        self.http = Some(http_client.clone());

        let cache = InMemoryCache::builder()
            .resource_types(ResourceType::GUILD | ResourceType::CHANNEL)
            .build();
        let cache = Arc::new(cache);
        self.cache = Some(cache.clone());

        // GUILDS is enough to get GUILD_CREATE and keep channels cached.
        let config = Config::new(self.token.clone(), Intents::GUILDS);

        let shards = gateway::create_recommended(&http_client, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?;

        for shard in shards {
            self.shard_senders.push(shard.sender());

            let tx_for_shard = tx.clone();
            let cache_for_shard = cache.clone();

            let handle = tokio::spawn(async move {
                shard_runner(shard, tx_for_shard, cache_for_shard).await;
            });
            self.shard_tasks.push(handle);
        }

        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }

        self.shard_senders.clear();
        self.shard_tasks.clear();
        self.rx = None;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn status_channel_requires_connection() {
        let platform = DiscordPlatform::new("token".into());
        assert!(matches!(platform.status_channel(1), Err(Error::Platform(_))));
    }

    #[tokio::test]
    async fn empty_token_is_rejected_before_connecting() {
        let mut platform = DiscordPlatform::new(String::new());
        assert!(platform.connect().await.is_err());
        assert_eq!(platform.connection_status, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn no_event_stream_before_connect() {
        let mut platform = DiscordPlatform::new("token".into());
        assert!(platform.take_gateway_events().is_none());
    }

    #[tokio::test]
    async fn event_stream_is_handed_out_once() {
        let mut platform = DiscordPlatform::new("token".into());
        let (tx, rx) = unbounded_channel::<GatewayEvent>();
        platform.rx = Some(rx);

        let mut events = platform.take_gateway_events().expect("first take");
        assert!(platform.take_gateway_events().is_none());

        let ready = GatewayEvent::Ready { shard_id: 0, user: "bot".into() };
        tx.send(ready.clone()).unwrap();
        drop(tx);
        assert_eq!(events.recv().await, Some(ready));
        assert_eq!(events.recv().await, None);
    }
}
