//! SDK Wire Types
//!
//! Mirrors the JSON shapes exchanged with the engine: the file descriptor
//! attached to task requests and the events pushed over the task stream.

use serde::{Deserialize, Serialize};

/// Opaque handle identifying an accepted task.
///
/// Returned by the engine on initiation, used once to build the stream
/// endpoint, not retained after streaming ends.
pub type TaskId = String;

/// Task status vocabulary.
///
/// The set is open: statuses the SDK does not know are carried through as
/// [`TaskStatus::Other`] instead of being treated as protocol errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Completed,
    Error,
    Failed,
    #[serde(untagged)]
    Other(String),
}

impl TaskStatus {
    /// True for the statuses that end the event sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Error | TaskStatus::Failed
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
            TaskStatus::Failed => "failed",
            TaskStatus::Other(status) => status,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upload-ready file attachment.
///
/// All three fields are mandatory on the wire; requests carrying a
/// descriptor with a missing field are rejected before send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub filename: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    /// File content, base64-encoded.
    pub base64: String,
}

/// One status update pushed by the engine during task execution.
///
/// Only `status` is guaranteed; every other field is status-dependent.
/// Fields the SDK does not model are preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    pub status: TaskStatus,
    /// Progress or diagnostic text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Final payload of a completed task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Legacy alias for `result`, still emitted by older engine builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StreamEvent {
    /// True when this event ends the sequence.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Final task payload, preferring `result` over the legacy `payload`.
    pub fn final_result(&self) -> Option<&serde_json::Value> {
        self.result.as_ref().or(self.payload.as_ref())
    }

    /// Error event synthesized client-side for failures that have no
    /// natural server event (initiation failures, stream faults).
    pub(crate) fn synthetic_error(message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Error,
            message: Some(message.into()),
            result: None,
            payload: None,
            extra: serde_json::Map::new(),
        }
    }
}
