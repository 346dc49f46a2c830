//! # audio-dl
//!
//! Concurrent batch audio downloader built on yt-dlp.
//!
//! ## Design Philosophy
//!
//! audio-dl is designed to be:
//! - **Bounded by default** - a fixed pool of yt-dlp processes, one per item
//! - **Sensible defaults** - works with `Config::default()` and a URL list
//! - **Observable** - progress is published as immutable snapshots, no
//!   polling of child processes
//! - **Testable** - process launching sits behind a trait, so whole batches
//!   can replay scripted output with no external binary
//!
//! ## Quick Start
//!
//! ```no_run
//! use audio_dl::{AudioDownloader, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sources = vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()];
//!     let downloader = AudioDownloader::new(sources, &Config::default())?;
//!
//!     // Observe progress while the batch runs
//!     let mut snapshots = downloader.snapshots();
//!     tokio::spawn(async move {
//!         while snapshots.changed().await.is_ok() {
//!             let stats = snapshots.borrow().stats;
//!             println!("{}/{} finished", stats.completed + stats.failed, stats.total);
//!         }
//!     });
//!
//!     let report = downloader.run().await?;
//!     println!("completed {}, failed {}", report.stats.completed, report.stats.failed);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// yt-dlp output line classification
pub mod classifier;
/// Configuration types
pub mod config;
/// Batch download orchestration (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// External tool discovery
pub mod tools;
/// Core types and progress events
pub mod types;
/// Source URL collection
pub mod urls;
/// yt-dlp process integration
pub mod ytdlp;

// Re-export commonly used types
pub use config::{AudioFormat, Config, DownloadConfig, ToolsConfig};
pub use downloader::AudioDownloader;
pub use error::{Error, Result};
pub use tools::{ResolvedTools, check_dependencies};
pub use types::{
    BatchReport, BatchSnapshot, BatchStats, FailureKind, ItemFailure, ItemId, ItemSnapshot,
    ProgressEvent, Status,
};
pub use ytdlp::{FetchScript, FetchSpawner, ScriptedSpawner, SpawnedFetch, YtDlpRunner};

/// Run the batch with graceful signal handling.
///
/// Cancels the batch on the first termination signal and resolves with the
/// usual [`BatchReport`]; items finished before the signal stay reported as
/// finished.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use audio_dl::{AudioDownloader, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sources = vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()];
///     let downloader = AudioDownloader::new(sources, &Config::default())?;
///
///     let report = run_with_shutdown(downloader).await?;
///     println!("cancelled: {}", report.cancelled);
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: AudioDownloader) -> Result<BatchReport> {
    let cancel = downloader.cancellation_token();
    let signal = tokio::spawn(async move {
        wait_for_signal().await;
        cancel.cancel();
    });

    let report = downloader.run().await;
    signal.abort();
    report
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
