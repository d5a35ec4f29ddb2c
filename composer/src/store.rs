//! View-facing handle onto the post composer.
//!
//! [`PostStore`] owns the runtime store, the submission service and the two
//! notification relays. A view layer dispatches actions and subscribes to
//! the three output streams; nothing else is exposed.

use crate::config::ComposerConfig;
use crate::error::{ComposerError, SubmissionError};
use crate::reactor::{PostEnvironment, PostReactor};
use crate::service::{SubmissionReceipt, SubmissionService};
use crate::types::{PostAction, PostState};
use reactorkit_core::environment::{Clock, SystemClock};
use reactorkit_runtime::{EffectHandle, RelayStream, StateStream, Store, StoreConfig};
use std::sync::Arc;
use std::time::Duration;

/// Post composer store.
///
/// Cloning yields another handle onto the same composer.
#[derive(Clone)]
pub struct PostStore {
    store: Store<PostReactor>,
}

impl PostStore {
    /// Create a composer backed by the system clock
    #[must_use]
    pub fn new(config: &ComposerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a composer with an injected clock
    #[must_use]
    pub fn with_clock(config: &ComposerConfig, clock: Arc<dyn Clock>) -> Self {
        let service = SubmissionService::with_latency(clock, config.submission_latency);
        let environment = PostEnvironment::new(Arc::new(service), config.channel_capacity);
        Self::from_environment(environment, config.store.clone())
    }

    /// Create a composer around a prepared environment
    #[must_use]
    pub fn from_environment(environment: PostEnvironment, config: StoreConfig) -> Self {
        tracing::debug!(?config, "Creating post store");
        Self {
            store: Store::with_config(
                PostState::default(),
                PostReactor::new(),
                environment,
                config,
            ),
        }
    }

    /// Dispatch a user action.
    ///
    /// Synchronous mutations (`UpdateText`, raising the busy flag on
    /// `Submit`) are visible when this returns. The handle completes once the
    /// submission has finished and the busy flag is down again.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::Store`] if the composer is shutting down.
    pub async fn dispatch(&self, action: PostAction) -> Result<EffectHandle, ComposerError> {
        Ok(self.store.send(action).await?)
    }

    /// Dispatch an action and wait for a state matching `predicate`
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::Store`] on shutdown or when no matching state
    /// shows up within `timeout`.
    pub async fn dispatch_and_wait_for<F>(
        &self,
        action: PostAction,
        predicate: F,
        timeout: Duration,
    ) -> Result<PostState, ComposerError>
    where
        F: Fn(&PostState) -> bool,
    {
        Ok(self.store.send_and_wait_for(action, predicate, timeout).await?)
    }

    /// Current state followed by every subsequent state
    pub async fn observe_state(&self) -> StateStream<PostState> {
        self.store.subscribe_state().await
    }

    /// One receipt per accepted submission, from now on
    #[must_use]
    pub fn observe_completed(&self) -> RelayStream<SubmissionReceipt> {
        self.store.environment().completed.subscribe()
    }

    /// One error per rejected submission, from now on
    #[must_use]
    pub fn observe_error(&self) -> RelayStream<SubmissionError> {
        self.store.environment().errors.subscribe()
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> PostState {
        self.store.state(Clone::clone).await
    }

    /// The submission service behind this composer
    #[must_use]
    pub fn service(&self) -> &SubmissionService {
        &self.store.environment().service
    }

    /// Stop accepting actions and wait for in-flight submissions
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::Store`] if submissions are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ComposerError> {
        Ok(self.store.shutdown(timeout).await?)
    }

    /// [`shutdown`](Self::shutdown) with the configured default timeout
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::Store`] if submissions are still running
    /// once the default timeout elapses.
    pub async fn shutdown_default(&self) -> Result<(), ComposerError> {
        Ok(self.store.shutdown_default().await?)
    }
}

impl std::fmt::Debug for PostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostStore")
            .field("pending_effects", &self.store.pending_effects())
            .finish_non_exhaustive()
    }
}
