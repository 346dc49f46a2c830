//! Concurrent batch download orchestration split into focused submodules.
//!
//! - `scheduler` - FIFO admission into the bounded worker pool
//! - `worker` - one yt-dlp process per item, output turned into events
//! - `aggregator` - single-writer item table and batch counters
//!
//! [`AudioDownloader`] wires the three together: workers report into one
//! shared event channel, the run loop folds every event into the table and
//! publishes a fresh snapshot for observers, and each terminal event admits
//! the next queued item.

mod aggregator;
mod scheduler;
mod worker;


use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::tools;
use crate::types::{BatchReport, BatchSnapshot};
use crate::ytdlp::{FetchSpawner, YtDlpRunner};

use aggregator::{Aggregator, Applied};
use scheduler::Scheduler;

/// Capacity of the shared progress event channel. Workers block briefly when
/// the aggregation loop falls behind rather than buffering without bound.
const EVENT_BUFFER: usize = 256;

/// Batch downloader driving one yt-dlp process per item.
///
/// Construction validates everything that can fail up front: external tools,
/// the output directory, and a non-empty source list. [`run`] then owns the
/// whole lifecycle and resolves with a [`BatchReport`] once every item has
/// finished or cancellation was requested.
///
/// [`run`]: AudioDownloader::run
pub struct AudioDownloader {
    sources: Vec<String>,
    limit: usize,
    spawner: Arc<dyn FetchSpawner>,
    table: Aggregator,
    cancel: CancellationToken,
    snapshot_tx: watch::Sender<BatchSnapshot>,
    snapshot_rx: watch::Receiver<BatchSnapshot>,
}

impl AudioDownloader {
    /// Verify external tools, prepare the output directory, and build a
    /// downloader for `sources`.
    ///
    /// An empty source list is rejected before tool preflight; a usage error
    /// should not surface as a complaint about the environment.
    pub fn new(sources: Vec<String>, config: &Config) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::NoSources);
        }
        let resolved = tools::check_dependencies(&config.tools)?;
        let runner = YtDlpRunner::new(resolved.ytdlp, &config.download);
        Self::with_spawner(sources, config, Arc::new(runner))
    }

    /// Build a downloader on a custom process spawner.
    ///
    /// Skips tool preflight, which belongs to the yt-dlp backend; scripted
    /// batches and embedders with their own launch policy use this directly.
    pub fn with_spawner(
        sources: Vec<String>,
        config: &Config,
        spawner: Arc<dyn FetchSpawner>,
    ) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::NoSources);
        }

        let output_dir = config.output_dir();
        std::fs::create_dir_all(output_dir).map_err(|source| Error::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let table = Aggregator::new(&sources);
        let (snapshot_tx, snapshot_rx) = watch::channel(table.snapshot());

        Ok(Self {
            limit: config.max_concurrent_downloads(),
            sources,
            spawner,
            table,
            cancel: CancellationToken::new(),
            snapshot_tx,
            snapshot_rx,
        })
    }

    /// Watch-side view of the batch, replaced after every applied event.
    ///
    /// The channel closes when the batch finishes, so display loops can use
    /// a failing `changed()` as their exit signal.
    pub fn snapshots(&self) -> watch::Receiver<BatchSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Token that aborts the batch when cancelled.
    ///
    /// Cancellation is fire-and-forget: [`run`](AudioDownloader::run)
    /// returns promptly with `cancelled` set, and running processes are
    /// killed as their worker tasks are dropped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the batch to completion or cancellation.
    pub async fn run(self) -> Result<BatchReport> {
        let Self {
            sources,
            limit,
            spawner,
            mut table,
            cancel,
            snapshot_tx,
            snapshot_rx,
        } = self;

        let (event_tx, mut event_rx) = mpsc::channel(EVENT_BUFFER);
        let mut scheduler = Scheduler::new(&sources, limit, spawner, event_tx);
        scheduler.admit_initial();
        tracing::info!(total = sources.len(), limit, "batch started");

        let mut cancelled = false;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("cancellation requested, aborting running downloads");
                    cancelled = true;
                    break;
                }
                event = event_rx.recv() => {
                    // The scheduler keeps a sender alive, so the channel
                    // cannot close before this loop exits.
                    let Some(event) = event else { break };
                    match table.apply(event) {
                        Applied::Progressed => {
                            snapshot_tx.send_replace(table.snapshot());
                        }
                        Applied::Terminal => {
                            snapshot_tx.send_replace(table.snapshot());
                            if table.is_done() {
                                break;
                            }
                            scheduler.admit_next();
                        }
                        Applied::Ignored => {}
                    }
                }
            }
        }

        if cancelled {
            // Dropping the pool aborts the worker tasks; each task's child
            // process is killed with it.
            drop(scheduler);
        } else {
            scheduler.join_all().await;
        }

        let stats = table.stats();
        tracing::info!(
            completed = stats.completed,
            failed = stats.failed,
            cancelled,
            "batch finished"
        );
        drop(snapshot_rx);

        Ok(BatchReport {
            stats,
            items: table.into_items(),
            cancelled,
        })
    }
}
