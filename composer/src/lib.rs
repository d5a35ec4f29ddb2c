//! # Post Composer
//!
//! A short-post composer built on the reactor runtime.
//!
//! The composer tracks a draft, reports how many characters are left before
//! the 140 character limit, shows a busy flag while a post is being
//! submitted, and reports each submission outcome once.
//!
//! ## Architecture
//!
//! - [`PostState`]: the draft and the busy flag, plus derived values
//! - [`PostAction`]: `UpdateText` and `Submit`
//! - [`PostReactor`]: maps actions to mutations and side effects
//! - [`SubmissionService`]: simulated endpoint that rejects repeats
//! - [`PostStore`]: the handle a view layer talks to
//!
//! ## Example
//!
//! ```no_run
//! use post_composer::{ComposerConfig, PostAction, PostStore};
//!
//! # async fn example() -> Result<(), post_composer::ComposerError> {
//! let store = PostStore::new(&ComposerConfig::default());
//! let mut completed = store.observe_completed();
//!
//! store.dispatch(PostAction::UpdateText("hi".into())).await?;
//! assert_eq!(store.state().await.remaining_count(), 138);
//!
//! let mut handle = store.dispatch(PostAction::Submit).await?;
//! handle.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod reactor;
pub mod service;
pub mod store;
pub mod types;

pub use config::{ComposerConfig, MAX_LENGTH, SUBMISSION_LATENCY};
pub use error::{ComposerError, SubmissionError};
pub use reactor::{PostEnvironment, PostReactor};
pub use service::{SubmissionFuture, SubmissionReceipt, SubmissionService};
pub use store::PostStore;
pub use types::{PostAction, PostMutation, PostState};
