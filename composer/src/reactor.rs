//! The post composer reactor.
//!
//! Turns user intents into state deltas:
//!
//! - `UpdateText(t)` sets the draft to `t`.
//! - `Submit` raises the busy flag, submits the current draft, reports the
//!   outcome on the completion or error relay, then lowers the busy flag.
//!
//! The outcome notification is always emitted after `is_submitting` became
//! true and before it becomes false again.

use crate::error::SubmissionError;
use crate::service::{SubmissionReceipt, SubmissionService};
use crate::types::{PostAction, PostMutation, PostState};
use reactorkit_core::{async_effect, effect::Effect, reactor::Reactor, smallvec, SmallVec};
use reactorkit_runtime::Relay;
use std::sync::Arc;

/// Dependencies injected into [`PostReactor`].
#[derive(Clone, Debug)]
pub struct PostEnvironment {
    /// Submission endpoint
    pub service: Arc<SubmissionService>,
    /// One value per accepted submission
    pub completed: Relay<SubmissionReceipt>,
    /// One value per rejected submission
    pub errors: Relay<SubmissionError>,
}

impl PostEnvironment {
    /// Create an environment with fresh relays of the given capacity
    #[must_use]
    pub fn new(service: Arc<SubmissionService>, channel_capacity: usize) -> Self {
        Self {
            service,
            completed: Relay::new(channel_capacity),
            errors: Relay::new(channel_capacity),
        }
    }
}

/// Post composer feature logic
#[derive(Clone, Debug, Default)]
pub struct PostReactor;

impl PostReactor {
    /// Create a new reactor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reactor for PostReactor {
    type State = PostState;
    type Action = PostAction;
    type Mutation = PostMutation;
    type Environment = PostEnvironment;

    fn mutate(
        &self,
        state: &Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Mutation>; 4]> {
        match action {
            PostAction::UpdateText(text) => {
                smallvec![Effect::Just(PostMutation::SetText(text))]
            },
            PostAction::Submit => {
                if state.is_submitting {
                    tracing::debug!("Submit while a submission is already in flight");
                }

                let outcome = env.service.submit(state.text.clone());
                let completed = env.completed.clone();
                let errors = env.errors.clone();

                smallvec![
                    Effect::Just(PostMutation::SetSubmitting(true)),
                    async_effect! {
                        match outcome.await {
                            Ok(receipt) => {
                                completed.emit(receipt);
                            },
                            Err(error) => {
                                errors.emit(error);
                            },
                        }
                        Some(PostMutation::SetSubmitting(false))
                    },
                ]
            },
        }
    }

    fn reduce(&self, state: &Self::State, mutation: Self::Mutation) -> Self::State {
        match mutation {
            PostMutation::SetText(text) => PostState {
                text,
                ..state.clone()
            },
            PostMutation::SetSubmitting(is_submitting) => PostState {
                is_submitting,
                ..state.clone()
            },
        }
    }
}
