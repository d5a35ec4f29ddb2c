//! Post composer demo
//!
//! Plays the role of the view layer: types each post given on the command
//! line (or a built-in script), submits it, and renders state changes and
//! submission outcomes as they arrive.
//!
//! ```text
//! cargo run -p post-composer -- hello hello "another one"
//! ```

use futures::StreamExt;
use post_composer::{ComposerConfig, PostAction, PostState, PostStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SCRIPT: &[&str] = &["hello", "hello", "a", "いまどうしてる？", ""];

fn render(state: &PostState) -> String {
    let marker = if state.is_submitting {
        "posting…"
    } else if state.can_submit() {
        "ready"
    } else {
        ""
    };
    format!("[{:>4}] {marker:<8} {:?}", state.remaining_count(), state.text)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "post_composer=debug,reactorkit_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    reactorkit_runtime::metrics::register_metrics();

    let config = ComposerConfig::from_env();
    tracing::info!(?config, "Starting post composer demo");

    let store = PostStore::new(&config);

    let mut states = store.observe_state().await;
    let mut completed = store.observe_completed();
    let mut errors = store.observe_error();

    let renderer = tokio::spawn(async move {
        while let Some(state) = states.next().await {
            println!("{}", render(&state));
        }
    });
    let alerts = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(receipt) = completed.next() => {
                    println!("  ✓ Posted successfully ({})", receipt.accepted_at.format("%H:%M:%S"));
                },
                Some(error) = errors.next() => {
                    println!("  ✗ Error: {error}");
                },
                else => break,
            }
        }
    });

    let posts: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            SCRIPT.iter().map(ToString::to_string).collect()
        } else {
            args
        }
    };

    for post in posts {
        store.dispatch(PostAction::UpdateText(post)).await?;

        let state = store.state().await;
        if !state.can_submit() {
            println!("  (submit disabled: {} characters left)", state.remaining_count());
            continue;
        }

        let mut handle = store.dispatch(PostAction::Submit).await?;
        handle.wait().await;
    }

    let last = store.state().await;
    println!("\nFinal state: {}", serde_json::to_string(&last)?);
    if let Some(text) = store.service().last_submitted() {
        println!("Last accepted post: {text:?}");
    }

    store.shutdown_default().await?;

    // Store handles keep the channels open; the printers are done with their work
    renderer.abort();
    alerts.abort();

    Ok(())
}
