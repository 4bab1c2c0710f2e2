//! Algorithm task records.

use serde::{Deserialize, Serialize};

use crate::{AlgorithmId, Model, TaskId, TaskStatus};

/// One execution attempt of an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub meta: Model<TaskId>,

    /// Current task status.
    pub status: TaskStatus,

    /// Algorithm this task executes.
    pub algorithm: AlgorithmId,
}

impl Task {
    pub fn new(meta: Model<TaskId>, algorithm: AlgorithmId) -> Self {
        Self {
            meta,
            status: TaskStatus::Created,
            algorithm,
        }
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> TaskId {
        self.meta.id
    }

    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Which part of a task log to fetch.
///
/// The server ignores a count of zero and returns the whole log, so
/// `Head(0)` and `Tail(0)` behave like `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogSlice {
    /// The whole log.
    #[default]
    All,
    /// The first `n` lines.
    Head(u32),
    /// The last `n` lines.
    Tail(u32),
}

impl LogSlice {
    /// Query parameters for the logs endpoint.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::All => Vec::new(),
            Self::Head(n) => vec![("head", n.to_string())],
            Self::Tail(n) => vec![("tail", n.to_string())],
        }
    }
}
