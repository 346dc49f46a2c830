//! Core types for audio-dl

use serde::{Deserialize, Serialize};

/// Stable identifier for a batch item
///
/// Wraps the item's position in the original request list. The index is the
/// correlation key for every event the item's worker emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl ItemId {
    /// Create a new ItemId
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the inner index value
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for ItemId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<ItemId> for usize {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl PartialEq<usize> for ItemId {
    fn eq(&self, other: &usize) -> bool {
        self.0 == *other
    }
}

impl PartialEq<ItemId> for usize {
    fn eq(&self, other: &ItemId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Waiting for a free worker slot
    Pending,
    /// Fetch task running
    Running,
    /// Fetch finished, audio extraction in progress
    Converting,
    /// Successfully completed
    Completed,
    /// Failed with error
    Failed,
}

impl Status {
    /// Whether this status ends the item's lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }

    /// Whether the item occupies a worker slot (running or converting)
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Running | Status::Converting)
    }
}

/// What went wrong for a failed item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Could not start the fetch task or attach to its output streams
    Launch,
    /// The fetch task ran but exited with a failure status
    Tool,
    /// I/O error while waiting on the fetch task
    Io,
}

/// Failure recorded on an item that reached `Status::Failed`
///
/// Item failures are data, not `Err` values: one item failing never aborts
/// its siblings or the batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Failure classification
    pub kind: FailureKind,
    /// Underlying error text, preserved as auxiliary context
    pub message: String,
}

impl ItemFailure {
    /// Failure to launch the fetch task
    pub fn launch(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Launch,
            message: message.into(),
        }
    }

    /// Fetch task exited unsuccessfully
    pub fn tool(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Tool,
            message: message.into(),
        }
    }

    /// I/O error while supervising the fetch task
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Io,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Event emitted by an item worker during the download lifecycle
///
/// Events are immutable values; ownership transfers to the channel at
/// emission and to the aggregator at receipt. Non-terminal events carry the
/// worker's current best-known title so the display stays annotated even
/// when a progress line itself names no title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Worker launched; the item is now running at 0%
    Started {
        /// Item ID
        id: ItemId,
    },

    /// A destination line revealed the item's human-readable title
    TitleDiscovered {
        /// Item ID
        id: ItemId,
        /// Discovered title, already normalized for display
        title: String,
    },

    /// Download percentage update
    Progress {
        /// Item ID
        id: ItemId,
        /// Progress percentage (0.0 to 100.0), as reported by the tool
        percent: f32,
        /// Current best-known title
        title: Option<String>,
    },

    /// The fetch finished downloading and entered audio extraction
    Converting {
        /// Item ID
        id: ItemId,
        /// Current best-known title
        title: Option<String>,
    },

    /// Fetch task exited successfully
    Completed {
        /// Item ID
        id: ItemId,
        /// Last known title
        title: Option<String>,
    },

    /// Fetch task failed to start or exited unsuccessfully
    Failed {
        /// Item ID
        id: ItemId,
        /// Failure details
        failure: ItemFailure,
        /// Last known title
        title: Option<String>,
    },
}

impl ProgressEvent {
    /// The item this event belongs to
    pub fn id(&self) -> ItemId {
        match self {
            ProgressEvent::Started { id }
            | ProgressEvent::TitleDiscovered { id, .. }
            | ProgressEvent::Progress { id, .. }
            | ProgressEvent::Converting { id, .. }
            | ProgressEvent::Completed { id, .. }
            | ProgressEvent::Failed { id, .. } => *id,
        }
    }

    /// Whether this event ends the item's lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. }
        )
    }
}

/// Read-only view of one item, as last observed by the aggregator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Item ID
    pub id: ItemId,

    /// Source reference (URL) as requested
    pub source: String,

    /// Discovered title, if any
    pub title: Option<String>,

    /// Current status
    pub status: Status,

    /// Progress percentage (0.0 to 100.0)
    pub percent: f32,

    /// Failure details, set only when status is Failed
    pub failure: Option<ItemFailure>,
}

impl ItemSnapshot {
    /// Title if discovered, otherwise the source reference
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.source)
    }
}

/// Batch counters maintained by the aggregator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Total number of items in the batch
    pub total: usize,

    /// Number of items currently running or converting
    pub active: usize,

    /// Number of successfully completed items
    pub completed: usize,

    /// Number of failed items
    pub failed: usize,
}

impl BatchStats {
    /// Whether every item has reached a terminal status
    pub fn is_finished(&self) -> bool {
        self.completed + self.failed == self.total
    }
}

/// Full view of the batch, published after every aggregator step
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSnapshot {
    /// Per-item snapshots, in request order
    pub items: Vec<ItemSnapshot>,

    /// Batch counters
    pub stats: BatchStats,
}

impl BatchSnapshot {
    /// Whether every item has reached a terminal status
    pub fn is_finished(&self) -> bool {
        self.stats.is_finished()
    }
}

/// Final result of a batch run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchReport {
    /// Final batch counters
    pub stats: BatchStats,

    /// Final per-item snapshots, in request order
    pub items: Vec<ItemSnapshot>,

    /// Whether the run was cancelled before every item finished
    pub cancelled: bool,
}
