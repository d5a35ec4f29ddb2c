//! Metric names and descriptions for the Store runtime.
//!
//! The runtime records through the [`metrics`] facade only. Installing a
//! recorder (Prometheus, statsd, a test recorder) is left to the binary; without
//! one every call is a no-op.
//!
//! # Example
//!
//! ```rust
//! reactorkit_runtime::metrics::register_metrics();
//! ```

use metrics::{describe_counter, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Actions accepted by `Store::send`
pub const ACTIONS_TOTAL: &str = "store.actions.total";
/// Actions rejected because the store is shutting down
pub const SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";
/// Mutations folded into state
pub const MUTATIONS_APPLIED: &str = "store.mutations.applied";
/// Effects started, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Time spent inside `Reactor::mutate`
pub const MUTATE_DURATION: &str = "store.reactor.mutate_duration_seconds";
/// State updates dropped for a lagging subscriber
pub const STATE_SUBSCRIBER_LAGGED: &str = "store.state.subscriber_lagged";
/// Relay notifications emitted
pub const RELAY_EMITTED: &str = "relay.emitted";

/// Register all metric descriptions.
///
/// Safe to call more than once; descriptions are idempotent.
pub fn register_metrics() {
    describe_counter!(ACTIONS_TOTAL, "Total number of actions sent to stores");
    describe_counter!(
        SHUTDOWN_REJECTED,
        "Actions rejected because the store was shutting down"
    );
    describe_counter!(
        MUTATIONS_APPLIED,
        "Total number of mutations reduced into state"
    );
    describe_counter!(EFFECTS_EXECUTED, "Total number of effects executed");
    describe_histogram!(MUTATE_DURATION, "Time taken to map an action into effects");
    describe_counter!(
        STATE_SUBSCRIBER_LAGGED,
        "State updates skipped by subscribers that fell behind"
    );
    describe_counter!(RELAY_EMITTED, "Notifications emitted through relays");
}
