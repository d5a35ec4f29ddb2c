//! Simulated remote submission endpoint.
//!
//! The service rejects a post whose text equals the immediately preceding
//! accepted one. The duplicate check and the record of the last accepted
//! text happen atomically when [`SubmissionService::submit`] is called; the
//! returned future only carries the simulated latency.

use crate::config::SUBMISSION_LATENCY;
use crate::error::SubmissionError;
use chrono::{DateTime, Utc};
use reactorkit_core::environment::Clock;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Outcome of an in-flight submission
pub type SubmissionFuture =
    Pin<Box<dyn Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send>>;

/// Acknowledgement for an accepted post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    /// The accepted text
    pub text: String,
    /// When the service accepted it
    pub accepted_at: DateTime<Utc>,
}

/// Stand-in for a remote posting API.
pub struct SubmissionService {
    clock: Arc<dyn Clock>,
    latency: Duration,
    last_submitted: Mutex<Option<String>>,
}

impl SubmissionService {
    /// Create a service with the standard one second latency
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_latency(clock, SUBMISSION_LATENCY)
    }

    /// Create a service with a custom latency
    #[must_use]
    pub fn with_latency(clock: Arc<dyn Clock>, latency: Duration) -> Self {
        Self {
            clock,
            latency,
            last_submitted: Mutex::new(None),
        }
    }

    /// Simulated latency of each submission
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    /// Text of the last accepted submission, if any
    #[must_use]
    pub fn last_submitted(&self) -> Option<String> {
        self.last_submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submit `text`.
    ///
    /// Whether the post is a duplicate is decided right away, in call order.
    /// The outcome is delivered by the returned future once the latency has
    /// elapsed. Rejected text does not replace the last accepted one, so
    /// submitting `"a"`, `"b"`, `"a"` succeeds three times.
    pub fn submit(&self, text: impl Into<String>) -> SubmissionFuture {
        let text = text.into();
        let accepted = self.record(&text);
        let latency = self.latency;
        let clock = Arc::clone(&self.clock);

        Box::pin(async move {
            tokio::time::sleep(latency).await;

            if accepted {
                tracing::info!("Succeeded: {text}");
                Ok(SubmissionReceipt {
                    text,
                    accepted_at: clock.now(),
                })
            } else {
                tracing::warn!("Error: {text}");
                Err(SubmissionError::Duplicate)
            }
        })
    }

    /// Compare against the last accepted text and store `text` if it differs
    fn record(&self, text: &str) -> bool {
        let mut last = self
            .last_submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if last.as_deref() == Some(text) {
            return false;
        }
        *last = Some(text.to_string());
        true
    }
}

impl std::fmt::Debug for SubmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionService")
            .field("latency", &self.latency)
            .field("last_submitted", &self.last_submitted())
            .finish_non_exhaustive()
    }
}
