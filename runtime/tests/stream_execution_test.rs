//! Integration tests for ordered effect execution in the Store runtime
//!
//! Mutations produced by one action are applied in emission order, whether
//! they come from a stream, a sequence, or a future following a synchronous
//! mutation.

#![allow(clippy::unwrap_used)] // Test code

use futures::stream;
use reactorkit_core::{
    async_effect, delay, effect::Effect, reactor::Reactor, smallvec, stream_effect, SmallVec,
};
use reactorkit_runtime::Store;
use reactorkit_testing::take_within;
use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq)]
struct LogState {
    lines: Vec<String>,
    busy: bool,
}

#[derive(Clone, Debug)]
enum LogAction {
    /// Emit every line through a stream effect
    Replay(Vec<String>),
    /// Raise busy, wait, append, lower busy
    Job(String),
    /// Two delayed appends chained one after the other
    Chain,
}

#[derive(Clone, Debug)]
enum LogMutation {
    Line(String),
    Busy(bool),
}

struct LogReactor;

impl Reactor for LogReactor {
    type State = LogState;
    type Action = LogAction;
    type Mutation = LogMutation;
    type Environment = ();

    fn mutate(
        &self,
        _state: &Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Mutation>; 4]> {
        match action {
            LogAction::Replay(lines) => {
                smallvec![stream_effect!(stream::iter(
                    lines.into_iter().map(LogMutation::Line)
                ))]
            },
            LogAction::Job(line) => smallvec![
                Effect::Just(LogMutation::Busy(true)),
                Effect::chain(vec![
                    async_effect! {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Some(LogMutation::Line(line))
                    },
                    Effect::Just(LogMutation::Busy(false)),
                ]),
            ],
            LogAction::Chain => smallvec![Effect::chain(vec![
                delay! {
                    duration: Duration::from_millis(30),
                    mutation: LogMutation::Line("slow".into())
                },
                delay! {
                    duration: Duration::from_millis(1),
                    mutation: LogMutation::Line("fast".into())
                },
            ])],
        }
    }

    fn reduce(&self, state: &Self::State, mutation: Self::Mutation) -> Self::State {
        let mut next = state.clone();
        match mutation {
            LogMutation::Line(line) => next.lines.push(line),
            LogMutation::Busy(busy) => next.busy = busy,
        }
        next
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_stream_items_applied_in_order() {
    let store = Store::new(LogState::default(), LogReactor, ());

    let mut handle = store
        .send(LogAction::Replay(lines(&["one", "two", "three"])))
        .await
        .unwrap();
    handle.wait().await;

    let state = store.state(Clone::clone).await;
    assert_eq!(state.lines, lines(&["one", "two", "three"]));
}

#[tokio::test]
async fn test_empty_stream_completes_without_mutations() {
    let store = Store::new(LogState::default(), LogReactor, ());
    let mut states = store.subscribe_state().await;

    let mut handle = store.send(LogAction::Replay(Vec::new())).await.unwrap();
    handle.wait().await;

    let seen = take_within(&mut states, 2, Duration::from_millis(20)).await;
    assert_eq!(seen.len(), 1);
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_busy_flag_brackets_async_work() {
    let store = Store::new(LogState::default(), LogReactor, ());
    let mut states = store.subscribe_state().await;

    let mut handle = store.send(LogAction::Job("done".into())).await.unwrap();
    assert!(store.state(|s| s.busy).await);
    handle.wait().await;

    let seen = take_within(&mut states, 4, Duration::from_secs(1)).await;
    let trace: Vec<_> = seen.iter().map(|s| (s.busy, s.lines.len())).collect();
    assert_eq!(trace, vec![(false, 0), (true, 0), (true, 1), (false, 1)]);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_delays_keep_declared_order() {
    let store = Store::new(LogState::default(), LogReactor, ());

    let mut handle = store.send(LogAction::Chain).await.unwrap();
    handle.wait().await;

    let state = store.state(Clone::clone).await;
    assert_eq!(state.lines, lines(&["slow", "fast"]));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_chains_interleave_without_loss() {
    let store = Store::new(LogState::default(), LogReactor, ());

    let mut first = store.send(LogAction::Job("a".into())).await.unwrap();
    let mut second = store.send(LogAction::Job("b".into())).await.unwrap();
    first.wait().await;
    second.wait().await;

    let state = store.state(Clone::clone).await;
    assert_eq!(state.lines.len(), 2);
    assert!(state.lines.contains(&"a".to_string()));
    assert!(state.lines.contains(&"b".to_string()));
    assert!(!state.busy);
}
