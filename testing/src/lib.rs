//! # Reactorkit Testing
//!
//! Testing utilities and helpers for reactorkit.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A fluent Given-When-Then harness for reactors
//! - Assertion helpers for effects
//! - Helpers for draining state and notification streams in tests
//!
//! ## Example
//!
//! ```ignore
//! use reactorkit_testing::{next_within, test_clock};
//! use reactorkit_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_post_flow() {
//!     let store = Store::new(PostState::default(), PostReactor::new(), env());
//!     let mut states = store.subscribe_state().await;
//!
//!     store.send(PostAction::UpdateText("hi".into())).await?;
//!
//!     let initial = next_within(&mut states, Duration::from_secs(1)).await;
//!     assert_eq!(initial.map(|s| s.text), Some(String::new()));
//! }
//! ```

use chrono::{DateTime, Utc};
use reactorkit_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reactorkit_testing::mocks::FixedClock;
    /// use reactorkit_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Stream helpers for async tests
pub mod helpers {
    use futures::{Stream, StreamExt};
    use std::time::Duration;

    /// Next item of `stream`, or `None` if nothing arrives within `timeout`
    /// (or the stream ended).
    pub async fn next_within<S>(stream: &mut S, timeout: Duration) -> Option<S::Item>
    where
        S: Stream + Unpin,
    {
        tokio::time::timeout(timeout, stream.next())
            .await
            .ok()
            .flatten()
    }

    /// Collect exactly `count` items, giving up after `timeout` overall.
    ///
    /// Returns whatever arrived if the timeout elapses first.
    pub async fn take_within<S>(stream: &mut S, count: usize, timeout: Duration) -> Vec<S::Item>
    where
        S: Stream + Unpin,
    {
        let mut items = Vec::with_capacity(count);
        let _ = tokio::time::timeout(timeout, async {
            while items.len() < count {
                match stream.next().await {
                    Some(item) => items.push(item),
                    None => break,
                }
            }
        })
        .await;
        items
    }
}

// Re-export commonly used items
pub use helpers::{next_within, take_within};
pub use mocks::{FixedClock, test_clock};
pub use reactor_test::{ReactorTest, assertions};
