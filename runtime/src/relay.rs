//! One-shot notification relays.
//!
//! A [`Relay`] is a multicast event emitter with no replay: subscribers only
//! receive values emitted after they subscribed. It complements the Store's
//! state stream, which always replays the latest state.
//!
//! # Example
//!
//! ```rust
//! use futures::StreamExt;
//! use reactorkit_runtime::relay::Relay;
//!
//! # async fn example() {
//! let relay = Relay::<String>::new(16);
//! let mut notices = relay.subscribe();
//!
//! relay.emit("done".to_string());
//! assert_eq!(notices.next().await.as_deref(), Some("done"));
//! # }
//! ```

use futures::Stream;
use std::pin::Pin;
use tokio::sync::broadcast;

/// Stream of relay notifications.
pub type RelayStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Default buffer size per subscriber.
pub const DEFAULT_RELAY_CAPACITY: usize = 16;

/// Multicast, no-replay event emitter.
///
/// Cloning a relay yields another handle onto the same channel.
#[derive(Debug)]
pub struct Relay<T> {
    sender: broadcast::Sender<T>,
}

impl<T> Relay<T>
where
    T: Clone + Send + 'static,
{
    /// Create a relay buffering up to `capacity` notifications per subscriber.
    ///
    /// The capacity is kept within `1..=MAX_CHANNEL_CAPACITY`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(crate::channel_capacity(capacity));
        Self { sender }
    }

    /// Emit a notification to every current subscriber.
    ///
    /// Returns the number of subscribers that will see it. Emitting with no
    /// subscribers drops the value.
    pub fn emit(&self, value: T) -> usize {
        metrics::counter!(crate::metrics::RELAY_EMITTED).increment(1);
        self.sender.send(value).unwrap_or(0)
    }

    /// Subscribe to notifications emitted from now on.
    ///
    /// The stream ends once every relay handle has been dropped. A subscriber
    /// that falls more than `capacity` notifications behind skips the oldest
    /// ones.
    #[must_use]
    pub fn subscribe(&self) -> RelayStream<T> {
        let mut rx = self.sender.subscribe();

        Box::pin(async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(value) => yield value,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Relay subscriber lagged, notifications skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> Clone for Relay<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> Default for Relay<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_RELAY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let relay = Relay::<u32>::default();
        let mut first = relay.subscribe();
        let mut second = relay.subscribe();

        assert_eq!(relay.emit(7), 2);

        assert_eq!(first.next().await, Some(7));
        assert_eq!(second.next().await, Some(7));
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscribers() {
        let relay = Relay::<u32>::default();
        assert_eq!(relay.emit(1), 0);

        let mut late = relay.subscribe();
        relay.emit(2);

        assert_eq!(late.next().await, Some(2));
    }

    #[tokio::test]
    async fn test_stream_ends_when_relay_dropped() {
        let relay = Relay::<u32>::default();
        let mut notices = relay.subscribe();
        let clone = relay.clone();

        drop(relay);
        clone.emit(3);
        drop(clone);

        assert_eq!(notices.next().await, Some(3));
        assert_eq!(notices.next().await, None);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_keeps_newest() {
        let relay = Relay::<u32>::new(2);
        let mut notices = relay.subscribe();

        for n in 0..5 {
            relay.emit(n);
        }

        let received = tokio::time::timeout(Duration::from_millis(100), async {
            vec![notices.next().await, notices.next().await]
        })
        .await;
        assert_eq!(received.ok(), Some(vec![Some(3), Some(4)]));
    }

    #[test]
    fn test_huge_capacity_is_lowered() {
        let relay = Relay::<u32>::new(usize::MAX);
        let _rx = relay.subscribe();
        assert_eq!(relay.emit(1), 1);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let relay = Relay::<u32>::new(0);
        assert_eq!(relay.subscriber_count(), 0);
        let _rx = relay.subscribe();
        assert_eq!(relay.subscriber_count(), 1);
    }
}
