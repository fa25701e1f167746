//! In-process block-arrival bus and the poller that feeds it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::{MissedTickBehavior, interval};

use crate::client::{ReportSource, fetch_best_block, fetch_block_range};
use crate::domain::{BlockPayload, ViewError};

// ============================================================================
// Block Bus
// ============================================================================

/// Publish/subscribe channel for block-arrival events.
///
/// Subscribers that fall behind skip the events they missed; the table
/// ignores the resulting height gaps.
#[derive(Debug, Clone)]
pub struct BlockBus {
    sender: broadcast::Sender<BlockPayload>,
}

impl BlockBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a block. Returns how many subscribers will see it.
    pub fn publish(&self, block: BlockPayload) -> usize {
        self.sender.send(block).unwrap_or(0)
    }

    /// Subscribe to blocks published from now on.
    #[must_use]
    pub fn subscribe(&self) -> BlockSubscription {
        BlockSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BlockBus {
    fn default() -> Self {
        Self::new(16)
    }
}

/// One subscriber's view of the bus.
#[derive(Debug)]
pub struct BlockSubscription {
    receiver: broadcast::Receiver<BlockPayload>,
}

impl BlockSubscription {
    /// Wait for the next block; `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<BlockPayload> {
        loop {
            match self.receiver.recv().await {
                Ok(block) => return Some(block),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Block subscriber lagged, skipped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next pending block without waiting.
    pub fn try_recv(&mut self) -> Option<BlockPayload> {
        loop {
            match self.receiver.try_recv() {
                Ok(block) => return Some(block),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Block subscriber lagged, skipped {skipped} events");
                }
                Err(_) => return None,
            }
        }
    }
}

// ============================================================================
// Block Feed
// ============================================================================

/// Polls the best block and publishes each new block onto a [`BlockBus`].
///
/// Blocks mined between two polls are fetched as a range and published in
/// height order, so subscribers never see a gap the feed could have filled.
pub struct BlockFeed {
    source: Arc<dyn ReportSource>,
    bus: BlockBus,
    poll_interval: Duration,
    last_height: Option<u64>,
    last_hash: String,
}

impl BlockFeed {
    /// Create a feed; nothing is fetched until polled.
    #[must_use]
    pub fn new(source: Arc<dyn ReportSource>, bus: BlockBus, poll_interval: Duration) -> Self {
        Self {
            source,
            bus,
            poll_interval,
            last_height: None,
            last_hash: String::new(),
        }
    }

    /// Start publishing only blocks above `height`.
    ///
    /// The tip at `height` is republished only after its hash has been seen
    /// once and then changes.
    #[must_use]
    pub fn starting_after(mut self, height: u64) -> Self {
        self.last_height = Some(height);
        self
    }

    /// Height of the last published block.
    #[must_use]
    pub const fn last_height(&self) -> Option<u64> {
        self.last_height
    }

    /// Fetch the best block once and publish whatever is new.
    ///
    /// Returns the published heights, oldest first:
    /// - a higher tip publishes every height since the last one;
    /// - a tip at the last height with a different hash is republished;
    /// - anything else publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch fails. Nothing is published then and the
    /// next poll retries from the same height.
    pub async fn poll_once(&mut self) -> Result<Vec<u64>, ViewError> {
        let Some(best) = fetch_best_block(self.source.as_ref()).await? else {
            return Ok(Vec::new());
        };
        let hash = best.raw_field("hash");

        let mut blocks = match self.last_height {
            Some(last) if best.height < last => return Ok(Vec::new()),
            Some(last) if best.height == last => {
                if hash.is_empty() || hash == self.last_hash {
                    return Ok(Vec::new());
                }
                if self.last_hash.is_empty() {
                    // First sight of the hash of a tip we were told about.
                    self.last_hash = hash;
                    return Ok(Vec::new());
                }
                tracing::debug!("Tip {} replaced", best.height);
                Vec::new()
            }
            Some(last) if best.height - last > 1 => {
                fetch_block_range(self.source.as_ref(), last + 1, best.height - 1)
                    .await?
                    .into_iter()
                    .filter(|b| (last + 1..best.height).contains(&b.height))
                    .collect()
            }
            _ => Vec::new(),
        };
        blocks.sort_by_key(|b| b.height);
        blocks.dedup_by_key(|b| b.height);
        blocks.push(best);

        self.last_hash = hash;
        let mut published = Vec::with_capacity(blocks.len());
        for block in blocks {
            let height = block.height;
            self.last_height = Some(height);
            let receivers = self.bus.publish(block);
            tracing::debug!("Published block {height} to {receivers} subscribers");
            published.push(height);
        }
        Ok(published)
    }

    /// Poll until `shutdown` turns `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::warn!("Best block poll failed: {e}");
                    }
                }
            }
        }
        tracing::debug!("Block feed stopped");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticSource;
    use crate::constants::BEST_BLOCK_ENDPOINT;
    use serde_json::json;

    fn block(height: u64) -> BlockPayload {
        BlockPayload {
            height,
            ..BlockPayload::default()
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let bus = BlockBus::new(4);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.publish(block(1)), 2);
        assert_eq!(a.recv().await.map(|b| b.height), Some(1));
        assert_eq!(b.try_recv().map(|b| b.height), Some(1));
        assert!(b.try_recv().is_none());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = BlockBus::default();
        assert_eq!(bus.publish(block(1)), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_missed_events() {
        let bus = BlockBus::new(2);
        let mut sub = bus.subscribe();
        for h in 1..=5 {
            bus.publish(block(h));
        }
        assert_eq!(sub.recv().await.map(|b| b.height), Some(4));
        assert_eq!(sub.recv().await.map(|b| b.height), Some(5));
    }

    #[tokio::test]
    async fn test_recv_ends_when_bus_dropped() {
        let bus = BlockBus::new(2);
        let mut sub = bus.subscribe();
        drop(bus);
        assert!(sub.recv().await.is_none());
    }

    fn heights(sub: &mut BlockSubscription) -> Vec<u64> {
        std::iter::from_fn(|| sub.try_recv()).map(|b| b.height).collect()
    }

    #[tokio::test]
    async fn test_feed_publishes_only_new_tips() {
        let source = Arc::new(
            StaticSource::new()
                .with_response(BEST_BLOCK_ENDPOINT, json!({"height": 42, "time": 1_700_000_000})),
        );
        let bus = BlockBus::new(4);
        let mut sub = bus.subscribe();
        let mut feed = BlockFeed::new(source.clone(), bus, Duration::from_secs(1));

        assert_eq!(feed.poll_once().await.unwrap(), vec![42]);
        assert!(feed.poll_once().await.unwrap().is_empty());
        assert_eq!(source.request_count(), 2);

        let published = sub.try_recv().unwrap();
        assert_eq!(published.height, 42);
        assert_eq!(published.unix_stamp, 1_700_000_000);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_feed_starting_after_skips_known_tip() {
        let source = Arc::new(
            StaticSource::new().with_response(BEST_BLOCK_ENDPOINT, json!({"height": 42})),
        );
        let mut feed =
            BlockFeed::new(source, BlockBus::default(), Duration::from_secs(1)).starting_after(42);
        assert!(feed.poll_once().await.unwrap().is_empty());
        assert_eq!(feed.last_height(), Some(42));
    }

    #[tokio::test]
    async fn test_feed_fills_blocks_between_polls() {
        let source = Arc::new(
            StaticSource::new()
                .with_response(BEST_BLOCK_ENDPOINT, json!({"height": 102}))
                .with_response("/api/block/range/101/101", json!([{"height": 101}])),
        );
        let bus = BlockBus::new(4);
        let mut sub = bus.subscribe();
        let mut feed =
            BlockFeed::new(source.clone(), bus, Duration::from_secs(1)).starting_after(100);

        assert_eq!(feed.poll_once().await.unwrap(), vec![101, 102]);
        assert_eq!(heights(&mut sub), vec![101, 102]);
        assert_eq!(feed.last_height(), Some(102));
        assert_eq!(
            source.requests(),
            vec![BEST_BLOCK_ENDPOINT.to_string(), "/api/block/range/101/101".to_string()]
        );
    }

    #[tokio::test]
    async fn test_feed_keeps_height_when_range_fails() {
        let source = Arc::new(
            StaticSource::new()
                .with_response(BEST_BLOCK_ENDPOINT, json!({"height": 105}))
                .with_response("/api/block/range/101/104", json!({"error": "busy"})),
        );
        let bus = BlockBus::new(8);
        let mut sub = bus.subscribe();
        let mut feed = BlockFeed::new(source, bus, Duration::from_secs(1)).starting_after(100);

        assert!(feed.poll_once().await.is_err());
        assert_eq!(feed.last_height(), Some(100));
        assert!(heights(&mut sub).is_empty());
    }

    #[tokio::test]
    async fn test_feed_republishes_replaced_tip() {
        let bus = BlockBus::new(4);
        let mut sub = bus.subscribe();
        let first = Arc::new(
            StaticSource::new()
                .with_response(BEST_BLOCK_ENDPOINT, json!({"height": 50, "hash": "aa"})),
        );
        let mut feed = BlockFeed::new(first, bus.clone(), Duration::from_secs(1));
        assert_eq!(feed.poll_once().await.unwrap(), vec![50]);
        assert!(feed.poll_once().await.unwrap().is_empty());

        let second: Arc<dyn ReportSource> = Arc::new(
            StaticSource::new()
                .with_response(BEST_BLOCK_ENDPOINT, json!({"height": 50, "hash": "bb"})),
        );
        feed.source = second;
        assert_eq!(feed.poll_once().await.unwrap(), vec![50]);
        assert!(feed.poll_once().await.unwrap().is_empty());

        let published: Vec<String> = std::iter::from_fn(|| sub.try_recv())
            .map(|b| b.raw_field("hash"))
            .collect();
        assert_eq!(published, vec!["aa", "bb"]);
    }

    #[tokio::test]
    async fn test_feed_stops_on_shutdown() {
        let source = Arc::new(StaticSource::new());
        let feed = BlockFeed::new(source, BlockBus::default(), Duration::from_millis(5));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(feed.run(rx));
        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
