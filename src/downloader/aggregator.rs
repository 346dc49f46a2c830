//! Batch state aggregation
//!
//! One task owns the item table; workers only report through the shared
//! event channel, so every mutation happens here and nothing needs a lock.
//! Events arriving for an item that already reached a terminal status are
//! dropped, which makes duplicate or late worker reports harmless.

use crate::types::{
    BatchSnapshot, BatchStats, ItemId, ItemSnapshot, ProgressEvent, Status,
};

/// What applying one event did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    /// Non-terminal update: start, title, percent, or conversion.
    Progressed,
    /// The item just reached `Completed` or `Failed`.
    Terminal,
    /// Dropped without effect.
    Ignored,
}

/// Single-writer item table plus derived batch counters.
#[derive(Debug)]
pub(crate) struct Aggregator {
    items: Vec<ItemSnapshot>,
    stats: BatchStats,
}

impl Aggregator {
    /// Build a table with one `Pending` row per source, in request order.
    pub(crate) fn new(sources: &[String]) -> Self {
        let items = sources
            .iter()
            .enumerate()
            .map(|(index, source)| ItemSnapshot {
                id: ItemId::new(index),
                source: source.clone(),
                title: None,
                status: Status::Pending,
                percent: 0.0,
                failure: None,
            })
            .collect();

        Self {
            items,
            stats: BatchStats {
                total: sources.len(),
                ..BatchStats::default()
            },
        }
    }

    /// Fold one worker event into the table.
    ///
    /// Percent values are stored as reported, including regressions; yt-dlp
    /// restarts its percentage for each sub-stream of a download.
    pub(crate) fn apply(&mut self, event: ProgressEvent) -> Applied {
        let id = event.id();
        let Some(item) = self.items.get_mut(id.get()) else {
            tracing::warn!(id = id.get(), "event for unknown item index, dropping");
            return Applied::Ignored;
        };

        if item.status.is_terminal() {
            tracing::debug!(id = id.get(), status = ?item.status, "event after terminal status, dropping");
            return Applied::Ignored;
        }

        let was_active = item.status.is_active();
        match event {
            ProgressEvent::Started { .. } => {
                if item.status != Status::Pending {
                    tracing::debug!(id = id.get(), "duplicate start, dropping");
                    return Applied::Ignored;
                }
                item.status = Status::Running;
                self.stats.active += 1;
                Applied::Progressed
            }
            ProgressEvent::TitleDiscovered { title, .. } => {
                item.title = Some(title);
                Applied::Progressed
            }
            ProgressEvent::Progress { percent, title, .. } => {
                item.percent = percent;
                merge_title(item, title);
                Applied::Progressed
            }
            ProgressEvent::Converting { title, .. } => {
                if item.status != Status::Running {
                    tracing::debug!(id = id.get(), status = ?item.status, "unexpected conversion, dropping");
                    return Applied::Ignored;
                }
                item.status = Status::Converting;
                item.percent = 100.0;
                merge_title(item, title);
                Applied::Progressed
            }
            ProgressEvent::Completed { title, .. } => {
                item.status = Status::Completed;
                item.percent = 100.0;
                merge_title(item, title);
                self.stats.completed += 1;
                if was_active {
                    self.stats.active -= 1;
                }
                Applied::Terminal
            }
            ProgressEvent::Failed { failure, title, .. } => {
                item.status = Status::Failed;
                item.failure = Some(failure);
                merge_title(item, title);
                self.stats.failed += 1;
                if was_active {
                    self.stats.active -= 1;
                }
                Applied::Terminal
            }
        }
    }

    /// Whether every item has reached a terminal status.
    pub(crate) fn is_done(&self) -> bool {
        self.stats.is_finished()
    }

    pub(crate) fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Point-in-time copy of the whole table for observers.
    pub(crate) fn snapshot(&self) -> BatchSnapshot {
        BatchSnapshot {
            items: self.items.clone(),
            stats: self.stats,
        }
    }

    /// Consume the table for the final report.
    pub(crate) fn into_items(self) -> Vec<ItemSnapshot> {
        self.items
    }
}

/// A `None` title never erases one discovered earlier.
fn merge_title(item: &mut ItemSnapshot, title: Option<String>) {
    if let Some(title) = title {
        item.title = Some(title);
    }
}
