//! Status enums for algorithm tasks and checksum files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an algorithm task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task record exists but nothing has been scheduled yet.
    #[default]
    Created,
    /// Task is waiting for a worker.
    Queued,
    /// Task is executing.
    Running,
    /// Task finished with an error.
    Failed,
    /// Task finished successfully.
    Success,
}

impl TaskStatus {
    /// Returns true if the task has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Success)
    }

    /// Returns true if the task is still active (not terminal).
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Failed => "failed",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Status of a checksum file's validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumFileStatus {
    #[default]
    Created,
    Queued,
    Running,
    Failed,
    Success,
    /// Validation was not attempted.
    Skipped,
}

impl ChecksumFileStatus {
    /// Returns true once validation has settled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Success | Self::Skipped)
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Failed => "failed",
            Self::Success => "success",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ChecksumFileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_terminal() {
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Queued.is_active());
        assert!(TaskStatus::Running.is_active());
    }

    #[test]
    fn test_task_status_wire_names() {
        let status: TaskStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, TaskStatus::Running);
        assert_eq!(serde_json::to_string(&TaskStatus::Success).unwrap(), "\"success\"");
    }

    #[test]
    fn test_task_status_rejects_skipped() {
        assert!(serde_json::from_str::<TaskStatus>("\"skipped\"").is_err());
        assert!(serde_json::from_str::<TaskStatus>("\"RUNNING\"").is_err());
    }

    #[test]
    fn test_checksum_status_accepts_skipped() {
        let status: ChecksumFileStatus = serde_json::from_str("\"skipped\"").unwrap();
        assert_eq!(status, ChecksumFileStatus::Skipped);
        assert!(status.is_terminal());
    }
}
