// serverwatch-core/src/tasks/status_poller.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use serverwatch_common::models::{MessageHandle, StatusReport};

use crate::platforms::{StatusChannel, StatusSource};
use crate::services::{publish, render};

/// Fetch → render → publish, once per interval.
///
/// The message handle lives on the stack of [`StatusPoller::run`]; nothing else can see it.
pub struct StatusPoller<S, C> {
    source: S,
    channel: C,
    interval: Duration,
    started: AtomicBool,
}

impl<S, C> StatusPoller<S, C>
where
    S: StatusSource,
    C: StatusChannel,
{
    pub fn new(source: S, channel: C, interval: Duration) -> Self {
        Self {
            source,
            channel,
            interval,
            started: AtomicBool::new(false),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// One full cycle. Takes the current handle, returns the one for the next tick.
    pub async fn tick(&self, handle: Option<MessageHandle>) -> Option<MessageHandle> {
        let report = StatusReport::from(self.source.fetch_status().await);
        if let StatusReport::FetchError(diagnostic) = &report {
            error!("Failed to retrieve server data: {diagnostic}");
        }

        let payload = render(&report);
        let outcome = publish(&self.channel, &payload, handle).await;
        debug!("(StatusPoller) tick => {outcome:?}");
        outcome.next_handle()
    }

    /// Ticks until `shutdown` turns true (or its sender is dropped).
    /// Returns the handle held at exit.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Option<MessageHandle> {
        info!(
            "Starting player count update loop (every {}s)...",
            self.interval.as_secs_f64()
        );

        let mut handle = None;
        loop {
            if *shutdown.borrow() {
                break;
            }

            handle = self.tick(handle).await;

            tokio::select! {
                _ = sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Status loop stopped; last message handle = {handle:?}");
        handle
    }
}

impl<S, C> StatusPoller<S, C>
where
    S: StatusSource + 'static,
    C: StatusChannel + 'static,
{
    /// Spawns [`run`](Self::run) the first time it is called; later calls are no-ops returning `None`.
    pub fn start(
        self: &Arc<Self>,
        shutdown: watch::Receiver<bool>,
    ) -> Option<JoinHandle<Option<MessageHandle>>> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("(StatusPoller) already started => ignoring start request");
            return None;
        }

        let poller = Arc::clone(self);
        Some(tokio::spawn(async move { poller.run(shutdown).await }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::{MockStatusChannel, MockStatusSource};
    use crate::Error;
    use serverwatch_common::models::{ColorTag, StatusRecord};

    fn online(players: i32) -> StatusRecord {
        StatusRecord {
            address: "1.2.3.4:27015".into(),
            name: "Test Server".into(),
            players,
            max_players: 10,
            secure: true,
        }
    }

    #[tokio::test]
    async fn tick_renders_and_creates() {
        let mut source = MockStatusSource::new();
        source.expect_fetch_status().times(1).returning(|| Ok(Some(online(5))));

        let mut channel = MockStatusChannel::new();
        channel.expect_resolve_channel().returning(|| Ok(()));
        channel
            .expect_create_message()
            .withf(|p| p.color_tag == ColorTag::Ok && p.title().contains("Test Server"))
            .times(1)
            .returning(|_| Ok(MessageHandle(42)));

        let poller = StatusPoller::new(source, channel, Duration::from_millis(1));
        assert_eq!(poller.tick(None).await, Some(MessageHandle(42)));
    }

    #[tokio::test]
    async fn fetch_failure_still_publishes_error_payload() {
        let mut source = MockStatusSource::new();
        source
            .expect_fetch_status()
            .returning(|| Err(Error::Platform("operation timed out".into())));

        let mut channel = MockStatusChannel::new();
        channel.expect_resolve_channel().returning(|| Ok(()));
        channel
            .expect_find_message()
            .returning(|h| Ok(Some(h)));
        channel
            .expect_edit_message()
            .withf(|_, p| p.color_tag == ColorTag::Error)
            .times(1)
            .returning(|_, _| Ok(()));

        let poller = StatusPoller::new(source, channel, Duration::from_millis(1));
        assert_eq!(poller.tick(Some(MessageHandle(3))).await, Some(MessageHandle(3)));
    }

    #[tokio::test]
    async fn run_exits_immediately_when_already_shut_down() {
        let mut source = MockStatusSource::new();
        source.expect_fetch_status().never();
        let channel = MockStatusChannel::new();

        let (tx, rx) = watch::channel(true);
        let poller = StatusPoller::new(source, channel, Duration::from_secs(3600));
        assert_eq!(poller.run(rx).await, None);
        drop(tx);
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let mut source = MockStatusSource::new();
        source.expect_fetch_status().returning(|| Ok(None));
        let mut channel = MockStatusChannel::new();
        channel
            .expect_resolve_channel()
            .returning(|| Err(Error::NotFound("channel".into())));

        let poller = Arc::new(StatusPoller::new(source, channel, Duration::from_millis(5)));
        let (tx, rx) = watch::channel(false);

        let first = poller.start(rx.clone());
        assert!(first.is_some());
        assert!(poller.is_started());
        assert!(poller.start(rx.clone()).is_none());
        assert!(poller.start(rx).is_none());

        tx.send(true).unwrap();
        let last = first.unwrap().await.unwrap();
        assert_eq!(last, None);
    }
}
