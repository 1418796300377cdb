use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflows::matching::UserId;

/// Identifier wrapper for queue items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueItemId(pub String);

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The kinds of deferred work the queue carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueItemKind {
    Scrape,
    Match,
    Apply,
    Notify,
    Cleanup,
}

impl QueueItemKind {
    pub const fn label(self) -> &'static str {
        match self {
            QueueItemKind::Scrape => "scrape",
            QueueItemKind::Match => "match",
            QueueItemKind::Apply => "apply",
            QueueItemKind::Notify => "notify",
            QueueItemKind::Cleanup => "cleanup",
        }
    }
}

/// Item lifecycle: created `Pending`; a worker claims it (`Processing`,
/// attempt incremented); success ends in `Completed`, failure returns it to
/// `Pending` until attempts run out, then `Failed` with the last error kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl QueueStatus {
    pub const fn label(self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Processing => "processing",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, QueueStatus::Completed | QueueStatus::Failed)
    }
}

/// What the policy evaluator asks the store to enqueue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItemRequest {
    pub kind: QueueItemKind,
    pub owner: UserId,
    pub payload: Value,
}

impl QueueItemRequest {
    pub fn new(kind: QueueItemKind, owner: UserId) -> Self {
        Self {
            kind,
            owner,
            payload: Value::Null,
        }
    }

    pub fn with_payload(kind: QueueItemKind, owner: UserId, payload: Value) -> Self {
        Self {
            kind,
            owner,
            payload,
        }
    }
}

/// One unit of deferred background work with retry bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub kind: QueueItemKind,
    pub owner: UserId,
    pub payload: Value,
    pub status: QueueStatus,
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processing_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Payload for `Scrape` items: which portal to search and with what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapePayload {
    pub portal: String,
    pub query: String,
    pub location: String,
}

/// Payload for `Apply` items: the posting to submit to, by dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyPayload {
    pub job_url: String,
}
