//! # Reactorkit Runtime
//!
//! Runtime implementation for reactor-style unidirectional data flow.
//!
//! This crate provides the Store runtime that owns state, runs a reactor's
//! `mutate` for each action, executes the returned effects and folds every
//! produced mutation back into state through `reduce`.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that owns state and executes effects
//! - **State stream**: Replay-latest, lossless stream of states
//! - **Relay**: Multicast, no-replay notifications for one-shot events
//!
//! ## Example
//!
//! ```ignore
//! use reactorkit_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reactor, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//!
//! // Observe every state from now on (starting with the current one)
//! let mut states = store.subscribe_state().await;
//! ```

use reactorkit_core::{effect::Effect, reactor::Reactor};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Metric names and descriptions
pub mod metrics;

/// Multicast, no-replay notification relays
pub mod relay;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for effects or for a matching state
        #[error("Timeout waiting for store")]
        Timeout,

        /// State broadcast channel closed
        #[error("State broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;
pub use relay::{Relay, RelayStream};

use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Stream of states published by a [`Store`].
pub type StateStream<S> = Pin<Box<dyn Stream<Item = S> + Send>>;

/// Largest buffer a state or relay channel is created with.
///
/// Broadcast channels allocate every slot up front; larger requests are
/// lowered to this.
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 16;

/// Bring a requested channel capacity into `1..=MAX_CHANNEL_CAPACITY`
#[must_use]
pub const fn channel_capacity(requested: usize) -> usize {
    if requested == 0 {
        1
    } else if requested > MAX_CHANNEL_CAPACITY {
        MAX_CHANNEL_CAPACITY
    } else {
        requested
    }
}

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_state_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// let store = Store::with_config(state, reactor, env, config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Buffered states per state subscriber before it starts skipping
    pub state_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(state_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            state_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the state subscriber buffer size
    #[must_use]
    pub const fn with_state_capacity(mut self, capacity: usize) -> Self {
        self.state_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_capacity: 64,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects started by
/// one action (and the mutations they produce) to finish.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // Every mutation produced for Action::Start is now applied
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle and its internal tracking counterpart
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            // Every tracker is gone: nothing left that could decrement
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Ensures the effect counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - The runtime for reactors
pub mod store {
    use super::{
        channel_capacity, Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, Ordering, Reactor, RwLock, StateStream, StoreConfig,
        StoreError,
    };
    use crate::metrics::{
        ACTIONS_TOTAL, EFFECTS_EXECUTED, MUTATE_DURATION, MUTATIONS_APPLIED, SHUTDOWN_REJECTED,
        STATE_SUBSCRIBER_LAGGED,
    };
    use futures::StreamExt;
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reactor
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, the Store is its only writer)
    /// 2. Reactor (feature logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (mutations are folded back into state)
    /// 5. State publication (every new state is broadcast in application order)
    ///
    /// Mutations are applied one at a time under the write lock and broadcast
    /// while the lock is still held, so subscribers observe states in exactly
    /// the order they were produced.
    ///
    /// Cloning a Store yields another handle onto the same state.
    pub struct Store<R>
    where
        R: Reactor,
    {
        state: Arc<RwLock<R::State>>,
        reactor: Arc<R>,
        environment: Arc<R::Environment>,
        states: broadcast::Sender<R::State>,
        config: StoreConfig,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<R> Store<R>
    where
        R: Reactor + Send + Sync + 'static,
        R::State: Clone + Send + Sync + 'static,
        R::Action: Send + 'static,
        R::Mutation: Send + 'static,
        R::Environment: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reactor, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: R::State, reactor: R, environment: R::Environment) -> Self {
            Self::with_config(initial_state, reactor, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: R::State,
            reactor: R,
            environment: R::Environment,
            config: StoreConfig,
        ) -> Self {
            let (states, _) = broadcast::channel(channel_capacity(config.state_capacity));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reactor: Arc::new(reactor),
                environment: Arc::new(environment),
                states,
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// The environment this store injects into the reactor
        #[must_use]
        pub fn environment(&self) -> &R::Environment {
            &self.environment
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown using the configured default timeout
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still
        /// running when the timeout elapses.
        pub async fn shutdown_default(&self) -> Result<(), StoreError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        /// Initiate graceful shutdown
        ///
        /// 1. Stop accepting new actions
        /// 2. Wait for running effects to finish (they still apply their mutations)
        /// 3. Return once idle, or fail when `timeout` elapses
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still
        /// running when the timeout elapses.
        #[tracing::instrument(skip(self), name = "store_shutdown")]
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");

            // Set shutdown flag to reject new actions
            self.shutdown.store(true, Ordering::Release);

            let start = tokio::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running", pending
                    );
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(pending_effects = pending, "Waiting for effects to complete");
                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls `reactor.mutate(state, action, environment)`
        /// 3. Applies top-level [`Effect::Just`] mutations right away, in order
        /// 4. Releases the lock and starts the remaining effects asynchronously
        ///
        /// `send()` returns after starting effect execution, not completion.
        /// The returned [`EffectHandle`] can be awaited for completion.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reactor panics, the panic will propagate to the caller.
        /// `mutate` and `reduce` should not panic.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: R::Action) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!(SHUTDOWN_REJECTED).increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            metrics::counter!(ACTIONS_TOTAL).increment(1);

            let (handle, tracking) = EffectHandle::new();

            let deferred = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                let effects = self.reactor.mutate(&state, action, &self.environment);
                metrics::histogram!(MUTATE_DURATION).record(start.elapsed().as_secs_f64());
                tracing::trace!("Reactor returned {} effects", effects.len());

                let mut deferred = Vec::with_capacity(effects.len());
                for effect in effects {
                    match effect {
                        Effect::None => {},
                        Effect::Just(mutation) => {
                            metrics::counter!(EFFECTS_EXECUTED, "type" => "just").increment(1);
                            self.apply_locked(&mut state, mutation);
                        },
                        other => deferred.push(other),
                    }
                }
                deferred
            };

            for effect in deferred {
                self.execute_effect_internal(effect, tracking.clone());
            }
            tracing::debug!("Action processing completed, returning handle");

            Ok(handle)
        }

        /// Send an action and wait until a published state matches `predicate`
        ///
        /// Subscribes before sending, so no state produced by the action can be
        /// missed. The current state is checked too.
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        /// - [`StoreError::Timeout`]: no matching state before `timeout`
        /// - [`StoreError::ChannelClosed`]: the state stream ended
        pub async fn send_and_wait_for<F>(
            &self,
            action: R::Action,
            predicate: F,
            timeout: Duration,
        ) -> Result<R::State, StoreError>
        where
            F: Fn(&R::State) -> bool,
        {
            // Subscribe BEFORE sending to avoid race condition
            let mut states = self.subscribe_state().await;

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                while let Some(state) = states.next().await {
                    if predicate(&state) {
                        return Ok(state);
                    }
                }
                Err(StoreError::ChannelClosed)
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to states
        ///
        /// The stream yields the current state immediately, then every state
        /// produced afterwards, in application order and without gaps (unless
        /// the subscriber falls more than `state_capacity` states behind, in
        /// which case the oldest are skipped and a warning is logged).
        pub async fn subscribe_state(&self) -> StateStream<R::State> {
            // Snapshot and subscription under the same lock: nothing can be
            // published in between
            let (current, mut rx) = {
                let state = self.state.read().await;
                (state.clone(), self.states.subscribe())
            };

            Box::pin(async_stream::stream! {
                yield current;
                loop {
                    match rx.recv().await {
                        Ok(state) => yield state,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "State subscriber lagged, {} states skipped", skipped);
                            metrics::counter!(STATE_SUBSCRIBER_LAGGED).increment(skipped);
                        },
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            })
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let text = store.state(|s| s.text.clone()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&R::State) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Fold a mutation into state while the write lock is held
        fn apply_locked(&self, state: &mut R::State, mutation: R::Mutation) {
            let next = self.reactor.reduce(state, mutation);
            // No subscribers is fine: the state is still stored
            let _ = self.states.send(next.clone());
            *state = next;
            metrics::counter!(MUTATIONS_APPLIED).increment(1);
        }

        /// Acquire the write lock and fold a mutation into state
        async fn apply(&self, mutation: R::Mutation) {
            let mut state = self.state.write().await;
            self.apply_locked(&mut state, mutation);
        }

        /// Spawn an effect task with both completion and shutdown tracking
        fn spawn_tracked<F>(&self, tracking: &EffectTracking, task: F)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);

            let guard = DecrementGuard(tracking.clone());
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

            tokio::spawn(async move {
                let _guard = guard;
                let _pending_guard = pending_guard;
                task.await;
            });
        }

        /// Execute an effect with tracking
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Just`: Applies the mutation (in a task when nested)
        /// - `Future`: Executes async computation, applies resulting mutation if `Some`
        /// - `Delay`: Waits for duration, then applies mutation
        /// - `Stream`: Applies each item in order
        /// - `Parallel`: Executes effects concurrently
        /// - `Sequential`: Executes effects in order, waiting for each to complete
        ///
        /// The [`DecrementGuard`] ensures the counters are updated even if an
        /// effect panics.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into tasks
        fn execute_effect_internal(&self, effect: Effect<R::Mutation>, tracking: EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Just(mutation) => {
                    tracing::trace!("Executing nested Effect::Just");
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "just").increment(1);
                    let store = self.clone();
                    self.spawn_tracked(&tracking, async move {
                        store.apply(mutation).await;
                    });
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "future").increment(1);
                    let store = self.clone();
                    self.spawn_tracked(&tracking, async move {
                        if let Some(mutation) = fut.await {
                            tracing::trace!("Effect::Future produced a mutation");
                            store.apply(mutation).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no mutation");
                        }
                    });
                },
                Effect::Delay { duration, mutation } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "delay").increment(1);
                    let store = self.clone();
                    self.spawn_tracked(&tracking, async move {
                        tokio::time::sleep(duration).await;
                        tracing::trace!("Effect::Delay elapsed, applying mutation");
                        store.apply(*mutation).await;
                    });
                },
                Effect::Stream(mut stream) => {
                    tracing::trace!("Executing Effect::Stream");
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "stream").increment(1);
                    let store = self.clone();
                    self.spawn_tracked(&tracking, async move {
                        let mut count = 0_usize;
                        // The next item is not polled before the previous one is applied
                        while let Some(mutation) = stream.next().await {
                            store.apply(mutation).await;
                            count += 1;
                        }
                        tracing::trace!("Effect::Stream completed after {} mutations", count);
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect_internal(effect, tracking.clone());
                    }
                },
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "sequential").increment(1);
                    let store = self.clone();
                    self.spawn_tracked(&tracking, async move {
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!(
                                "Executing sequential effect {} of {}",
                                idx + 1,
                                effect_count
                            );
                            let (mut sub_handle, sub_tracking) = EffectHandle::new();
                            store.execute_effect_internal(effect, sub_tracking);
                            sub_handle.wait().await;
                        }
                        tracing::trace!("Effect::Sequential completed");
                    });
                },
            }
        }
    }

    impl<R> Clone for Store<R>
    where
        R: Reactor,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reactor: Arc::clone(&self.reactor),
                environment: Arc::clone(&self.environment),
                states: self.states.clone(),
                config: self.config.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
