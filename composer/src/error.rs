//! Error types for the post composer.

use reactorkit_runtime::StoreError;
use thiserror::Error;

/// Why a submission was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The text equals the immediately preceding accepted submission
    #[error("Your post is duplicated with the last one.")]
    Duplicate,
}

/// Errors surfaced by [`PostStore`](crate::PostStore).
#[derive(Error, Debug)]
pub enum ComposerError {
    /// The underlying store rejected or timed out the operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_is_human_readable() {
        assert_eq!(
            SubmissionError::Duplicate.to_string(),
            "Your post is duplicated with the last one."
        );
    }

    #[test]
    fn test_store_error_converts() {
        let error: ComposerError = StoreError::ShutdownInProgress.into();
        assert_eq!(error.to_string(), "Store is shutting down");
    }
}
