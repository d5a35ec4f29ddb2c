//! # Reactorkit Core
//!
//! Core traits and types for reactor-style unidirectional data flow.
//!
//! A reactor turns user intents into ordered state deltas and folds those
//! deltas into an observable state:
//!
//! ```text
//! Action ──mutate──▶ Effect<Mutation> ──runtime──▶ Mutation ──reduce──▶ State
//! ```
//!
//! ## Core Concepts
//!
//! - **State**: Immutable snapshot observed by the outside world
//! - **Action**: User intent dispatched into the reactor
//! - **Mutation**: Internal, ordered state delta (never observed outside)
//! - **Reactor**: `mutate` (Action → Effects) plus pure `reduce` (State, Mutation → State)
//! - **Effect**: Description of how mutations are produced (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O in `reduce`)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```
//! use reactorkit_core::{effect::Effect, reactor::Reactor, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! enum CounterAction {
//!     Increment,
//! }
//!
//! enum CounterMutation {
//!     Add(i64),
//! }
//!
//! struct CounterReactor;
//!
//! impl Reactor for CounterReactor {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Mutation = CounterMutation;
//!     type Environment = ();
//!
//!     fn mutate(
//!         &self,
//!         _state: &CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterMutation>; 4]> {
//!         match action {
//!             CounterAction::Increment => smallvec![Effect::Just(CounterMutation::Add(1))],
//!         }
//!     }
//!
//!     fn reduce(&self, state: &CounterState, mutation: CounterMutation) -> CounterState {
//!         let mut state = state.clone();
//!         match mutation {
//!             CounterMutation::Add(n) => state.count += n,
//!         }
//!         state
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for effect construction
pub mod effect_macros;

/// Reactor module - The core trait for feature logic
///
/// Reactors split the work of a feature in two:
///
/// - `mutate` decides *what should happen* for an action and returns effect
///   descriptions producing mutations
/// - `reduce` folds a single mutation into a new state, purely
pub mod reactor {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reactor trait - core abstraction for feature logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The observable state this reactor produces
    /// - `Action`: The user intents this reactor accepts
    /// - `Mutation`: The internal state deltas produced by effects
    /// - `Environment`: The injected dependencies this reactor needs
    pub trait Reactor {
        /// The state type this reactor produces
        type State;

        /// The action type this reactor accepts
        type Action;

        /// The mutation type produced by effects and consumed by `reduce`
        type Mutation;

        /// The environment type with injected dependencies
        type Environment;

        /// Map an action into effect descriptions
        ///
        /// `state` is the current state at the moment the action is processed.
        /// Effects are executed by the runtime in the order they are returned;
        /// [`Effect::Just`] mutations are applied before the runtime hands
        /// control back to the dispatcher.
        fn mutate(
            &self,
            state: &Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Mutation>; 4]>;

        /// Fold a mutation into a new state
        ///
        /// Must be pure, total and synchronous. The input state is left
        /// untouched; the returned value replaces it.
        fn reduce(&self, state: &Self::State, mutation: Self::Mutation) -> Self::State;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe how mutations come into existence. They are values (not
/// execution) and are composable.
pub mod effect {
    use futures::Stream;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes how mutations are produced
    ///
    /// Effects are NOT executed immediately. They are returned from
    /// [`Reactor::mutate`](crate::reactor::Reactor::mutate) and executed by
    /// the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Mutation`: The mutation type that effects can produce
    pub enum Effect<Mutation> {
        /// No-op effect
        None,

        /// A mutation available right away
        ///
        /// At the top level of `mutate` output it is applied synchronously,
        /// before `send` returns.
        Just(Mutation),

        /// Run effects in parallel
        Parallel(Vec<Effect<Mutation>>),

        /// Run effects sequentially, each one fully applied before the next starts
        Sequential(Vec<Effect<Mutation>>),

        /// Delayed mutation
        Delay {
            /// How long to wait
            duration: Duration,
            /// Mutation to apply after delay
            mutation: Box<Mutation>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Mutation>` - if Some, the mutation is applied to state
        Future(Pin<Box<dyn Future<Output = Option<Mutation>> + Send>>),

        /// Async stream of mutations
        ///
        /// Each item is applied in order; the next item is not polled until the
        /// previous one has been applied.
        Stream(Pin<Box<dyn Stream<Item = Mutation> + Send>>),
    }

    // Manual Debug implementation since Future/Stream don't implement Debug
    impl<Mutation> std::fmt::Debug for Effect<Mutation>
    where
        Mutation: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Just(mutation) => f.debug_tuple("Effect::Just").field(mutation).finish(),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, mutation } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("mutation", mutation)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Stream(_) => write!(f, "Effect::Stream(<stream>)"),
            }
        }
    }

    impl<Mutation> Effect<Mutation> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Mutation>>) -> Effect<Mutation> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Mutation>>) -> Effect<Mutation> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
