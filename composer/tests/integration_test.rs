//! End-to-end tests for the post composer
//!
//! Drive a real [`PostStore`] the way a view layer would and check what the
//! three observable streams report. Time is paused so the one second
//! submission latency elapses instantly.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use futures::StreamExt;
use post_composer::{
    ComposerConfig, PostAction, PostState, PostStore, SubmissionError, SUBMISSION_LATENCY,
};
use reactorkit_testing::{next_within, take_within, test_clock};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn composer() -> PostStore {
    PostStore::with_clock(&ComposerConfig::default(), Arc::new(test_clock()))
}

async fn submit(store: &PostStore, text: &str) {
    store
        .dispatch(PostAction::UpdateText(text.to_string()))
        .await
        .unwrap();
    let mut handle = store.dispatch(PostAction::Submit).await.unwrap();
    handle.wait().await;
}

#[tokio::test(start_paused = true)]
async fn test_typing_hi_and_submitting() {
    let store = composer();
    let mut states = store.observe_state().await;
    let mut completed = store.observe_completed();

    let initial = next_within(&mut states, WAIT).await.unwrap();
    assert_eq!(initial, PostState::default());
    assert_eq!(initial.remaining_count(), 140);

    store
        .dispatch(PostAction::UpdateText("hi".into()))
        .await
        .unwrap();
    let typed = next_within(&mut states, WAIT).await.unwrap();
    assert_eq!(typed.text, "hi");
    assert_eq!(typed.remaining_count(), 138);
    assert!(typed.can_submit());

    store.dispatch(PostAction::Submit).await.unwrap();
    let busy = next_within(&mut states, WAIT).await.unwrap();
    assert!(busy.is_submitting);
    assert!(!busy.can_submit());

    let idle = next_within(&mut states, WAIT).await.unwrap();
    assert!(!idle.is_submitting);
    assert_eq!(idle.text, "hi");

    let receipt = next_within(&mut completed, WAIT).await.unwrap();
    assert_eq!(receipt.text, "hi");
}

#[tokio::test(start_paused = true)]
async fn test_repeat_submission_is_reported_as_duplicate() {
    let store = composer();
    let mut completed = store.observe_completed();
    let mut errors = store.observe_error();

    submit(&store, "hello").await;
    submit(&store, "hello").await;

    assert_eq!(next_within(&mut completed, WAIT).await.unwrap().text, "hello");
    assert_eq!(
        next_within(&mut errors, WAIT).await,
        Some(SubmissionError::Duplicate)
    );
    // Exactly one of each
    assert!(next_within(&mut completed, Duration::from_millis(10)).await.is_none());
    assert!(next_within(&mut errors, Duration::from_millis(10)).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_only_immediately_preceding_text_is_a_duplicate() {
    let store = composer();
    let mut completed = store.observe_completed();
    let mut errors = store.observe_error();

    for text in ["a", "b", "a"] {
        submit(&store, text).await;
    }

    let receipts = take_within(&mut completed, 3, WAIT).await;
    let texts: Vec<_> = receipts.into_iter().map(|r| r.text).collect();
    assert_eq!(texts, ["a", "b", "a"]);
    assert!(next_within(&mut errors, Duration::from_millis(10)).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_submissions_keep_call_order() {
    let store = composer();
    let mut completed = store.observe_completed();
    let mut errors = store.observe_error();

    store
        .dispatch(PostAction::UpdateText("hello".into()))
        .await
        .unwrap();
    let mut states = store.observe_state().await;
    let _ = next_within(&mut states, WAIT).await;

    // No reactor-side guard: both submissions go out
    let mut first = store.dispatch(PostAction::Submit).await.unwrap();
    let mut second = store.dispatch(PostAction::Submit).await.unwrap();
    first.wait().await;
    second.wait().await;

    assert_eq!(next_within(&mut completed, WAIT).await.unwrap().text, "hello");
    assert_eq!(
        next_within(&mut errors, WAIT).await,
        Some(SubmissionError::Duplicate)
    );

    let flags: Vec<_> = take_within(&mut states, 4, WAIT)
        .await
        .into_iter()
        .map(|s| s.is_submitting)
        .collect();
    assert_eq!(flags, [true, true, false, false]);
    assert!(!store.state().await.is_submitting);
}

#[tokio::test(start_paused = true)]
async fn test_busy_flag_brackets_notification() {
    let store = composer();
    store
        .dispatch(PostAction::UpdateText("bracketed".into()))
        .await
        .unwrap();

    let mut states = store.observe_state().await;
    let mut completed = store.observe_completed();
    let _ = next_within(&mut states, WAIT).await;

    store.dispatch(PostAction::Submit).await.unwrap();
    assert!(next_within(&mut states, WAIT).await.unwrap().is_submitting);
    assert!(next_within(&mut completed, Duration::ZERO).await.is_none());

    assert!(!next_within(&mut states, WAIT).await.unwrap().is_submitting);

    // Already buffered by the time the flag went down
    let receipt = next_within(&mut completed, Duration::ZERO).await.unwrap();
    assert_eq!(receipt.text, "bracketed");
}

#[tokio::test(start_paused = true)]
async fn test_busy_flag_sequence_for_failed_submission() {
    let store = composer();
    submit(&store, "twice").await;

    let mut states = store.observe_state().await;
    let mut errors = store.observe_error();
    let _ = next_within(&mut states, WAIT).await;

    store.dispatch(PostAction::Submit).await.unwrap();
    assert!(next_within(&mut states, WAIT).await.unwrap().is_submitting);
    assert!(next_within(&mut errors, Duration::ZERO).await.is_none());

    assert!(!next_within(&mut states, WAIT).await.unwrap().is_submitting);
    assert_eq!(
        next_within(&mut errors, Duration::ZERO).await,
        Some(SubmissionError::Duplicate)
    );
}

#[tokio::test(start_paused = true)]
async fn test_submission_takes_the_simulated_latency() {
    let store = composer();
    store
        .dispatch(PostAction::UpdateText("patience".into()))
        .await
        .unwrap();

    let start = tokio::time::Instant::now();
    let mut handle = store.dispatch(PostAction::Submit).await.unwrap();
    handle.wait().await;
    assert!(start.elapsed() >= SUBMISSION_LATENCY);
}

#[tokio::test]
async fn test_update_text_twice_yields_equal_states() {
    let store = composer();
    let mut states = store.observe_state().await;
    let _ = states.next().await;

    for _ in 0..2 {
        store
            .dispatch(PostAction::UpdateText("t".into()))
            .await
            .unwrap();
    }

    let first = next_within(&mut states, WAIT).await.unwrap();
    let second = next_within(&mut states, WAIT).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(store.state().await, first);
}

#[tokio::test]
async fn test_over_long_draft_cannot_be_submitted() {
    let store = composer();
    let state = store
        .dispatch_and_wait_for(
            PostAction::UpdateText("x".repeat(141)),
            |s| !s.text.is_empty(),
            WAIT,
        )
        .await
        .unwrap();

    assert_eq!(state.remaining_count(), -1);
    assert!(!state.can_submit());
}

#[tokio::test]
async fn test_late_subscriber_gets_no_old_notifications() {
    let store = PostStore::with_clock(
        &ComposerConfig::default().with_submission_latency(Duration::ZERO),
        Arc::new(test_clock()),
    );
    submit(&store, "early").await;

    let mut completed = store.observe_completed();
    assert!(next_within(&mut completed, Duration::from_millis(50)).await.is_none());
}

#[tokio::test]
async fn test_every_subscriber_sees_each_notification() {
    let store = PostStore::with_clock(
        &ComposerConfig::default().with_submission_latency(Duration::ZERO),
        Arc::new(test_clock()),
    );
    let mut first = store.observe_completed();
    let mut second = store.observe_completed();

    submit(&store, "shared").await;

    assert_eq!(next_within(&mut first, WAIT).await.unwrap().text, "shared");
    assert_eq!(next_within(&mut second, WAIT).await.unwrap().text, "shared");
}
