//! Domain types for the post composer.

use crate::config::MAX_LENGTH;
use serde::{Deserialize, Serialize};

/// Observable composer state.
///
/// A value snapshot: every change produces a new `PostState`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostState {
    /// Current draft
    pub text: String,
    /// True while a submission is in flight
    pub is_submitting: bool,
}

impl PostState {
    /// Draft length in characters (Unicode scalar values)
    #[must_use]
    pub fn length(&self) -> usize {
        self.text.chars().count()
    }

    /// Characters left before [`MAX_LENGTH`]; negative once the draft is too long
    #[must_use]
    pub fn remaining_count(&self) -> i64 {
        let max = i64::try_from(MAX_LENGTH).unwrap_or(i64::MAX);
        let used = i64::try_from(self.length()).unwrap_or(i64::MAX);
        max - used
    }

    /// Whether the draft may be submitted right now
    ///
    /// Advisory: the view layer disables its submit affordance when false.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        (1..=MAX_LENGTH).contains(&self.length()) && !self.is_submitting
    }
}

/// User intents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostAction {
    /// Replace the draft
    UpdateText(String),
    /// Submit the current draft
    Submit,
}

/// State deltas produced while handling an action.
///
/// Only the reactor produces and consumes these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostMutation {
    /// Replace the draft
    SetText(String),
    /// Toggle the busy indicator
    SetSubmitting(bool),
}
