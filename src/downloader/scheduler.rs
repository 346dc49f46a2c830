//! Admission scheduling for the worker pool
//!
//! Items wait in a FIFO queue and enter the pool in request order. The pool
//! is filled once up front; afterwards exactly one queued item is admitted
//! per finished item, so the number of live downloads never exceeds the
//! configured limit. Dropping the scheduler aborts every worker task, which
//! in turn kills the child processes they own.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::types::{ItemId, ProgressEvent};
use crate::ytdlp::FetchSpawner;

use super::worker;

pub(crate) struct Scheduler {
    pending: VecDeque<(ItemId, String)>,
    limit: usize,
    workers: JoinSet<()>,
    spawner: Arc<dyn FetchSpawner>,
    events: mpsc::Sender<ProgressEvent>,
}

impl Scheduler {
    /// Queue every source in request order; nothing starts yet.
    pub(crate) fn new(
        sources: &[String],
        limit: usize,
        spawner: Arc<dyn FetchSpawner>,
        events: mpsc::Sender<ProgressEvent>,
    ) -> Self {
        let pending = sources
            .iter()
            .enumerate()
            .map(|(index, source)| (ItemId::new(index), source.clone()))
            .collect();

        Self {
            pending,
            limit: limit.max(1),
            workers: JoinSet::new(),
            spawner,
            events,
        }
    }

    /// Fill the pool up to the concurrency limit.
    pub(crate) fn admit_initial(&mut self) {
        while self.workers.len() < self.limit && self.admit_next() {}
    }

    /// Start the next queued item, if any. Returns whether one started.
    pub(crate) fn admit_next(&mut self) -> bool {
        self.reap_finished();

        let Some((id, source)) = self.pending.pop_front() else {
            return false;
        };

        tracing::debug!(id = id.get(), %source, "admitting item");
        let spawner = Arc::clone(&self.spawner);
        let events = self.events.clone();
        self.workers.spawn(worker::run_item(spawner, id, source, events));
        true
    }

    /// Wait for every worker task to finish.
    pub(crate) async fn join_all(&mut self) {
        while let Some(result) = self.workers.join_next().await {
            log_join(result);
        }
    }

    /// Collect already-finished tasks so the set does not grow with the batch.
    fn reap_finished(&mut self) {
        while let Some(result) = self.workers.try_join_next() {
            log_join(result);
        }
    }
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(error) = result
        && !error.is_cancelled()
    {
        tracing::error!(%error, "download worker panicked");
    }
}
