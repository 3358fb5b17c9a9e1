//! # nekos-dl
//!
//! Mirrors images from an image-tagging API onto the local disk.
//!
//! A fixed set of (category, tag) pairs is polled forever. For each tag the
//! API is asked for a current image URL; if the image is not yet present
//! under `downloads/<category>/<tag>/` it is downloaded there. Any number of
//! identical polling loops can run at once over the same tag list.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nekos_dl::{Config, Runner, TagMap};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let tags = TagMap::load(&config.tags_file).await?;
//!     let runner = Arc::new(Runner::new(&tags, &config).await?);
//!
//!     let mut events = runner.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     nekos_dl::run_with_shutdown(runner, 4).await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration and the tag file
pub mod config;
/// Error types
pub mod error;
/// Subscriber setup for binaries
pub mod logging;
/// Concurrent polling loops
pub mod runner;
/// Per-tag resolve and download
pub mod tag;
/// Core types and events
pub mod types;

pub use config::{Config, ResolveMode, TagMap};
pub use error::{Error, Result};
pub use runner::Runner;
pub use tag::{SavedImage, Tag};
pub use types::{Event, FailureKind, LoopId};

use std::sync::Arc;

/// Run `loops` polling loops until a termination signal arrives.
///
/// The loops are not told to stop: returning drops them wherever they are,
/// possibly halfway through writing a file.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(runner: Arc<Runner>, loops: usize) {
    tokio::select! {
        _ = runner.run(loops) => {}
        _ = wait_for_signal() => {
            tracing::info!("Stopping polling loops");
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
