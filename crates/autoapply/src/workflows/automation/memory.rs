use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use super::queue::{
    QueueItem, QueueItemId, QueueItemKind, QueueItemRequest, QueueStatus, DEFAULT_MAX_ATTEMPTS,
};
use super::store::{QueueStore, StoreError};
use crate::workflows::matching::UserId;

/// In-memory queue store used by the service binary, demos, and tests.
///
/// All transitions happen under one lock, which is what makes the
/// `pending -> processing` claim exclusive: a second `claim_pending` in the
/// same window sees the items already in `processing` and skips them.
#[derive(Default)]
pub struct InMemoryQueueStore {
    items: Mutex<Vec<QueueItem>>,
    sequence: AtomicU64,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> QueueItemId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        QueueItemId(format!("queue-{id:06}"))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<QueueItem>>, StoreError> {
        self.items
            .lock()
            .map_err(|_| StoreError::Unavailable("queue mutex poisoned".to_string()))
    }
}

impl QueueStore for InMemoryQueueStore {
    fn enqueue(
        &self,
        request: QueueItemRequest,
        now: DateTime<Utc>,
    ) -> Result<QueueItem, StoreError> {
        let item = QueueItem {
            id: self.next_id(),
            kind: request.kind,
            owner: request.owner,
            payload: request.payload,
            status: QueueStatus::Pending,
            attempt_count: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            last_error: None,
            created_at: now,
            processing_at: None,
            processed_at: None,
        };

        let mut items = self.lock()?;
        items.push(item.clone());
        Ok(item)
    }

    fn claim_pending(
        &self,
        limit: usize,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Result<Vec<QueueItem>, StoreError> {
        let mut items = self.lock()?;

        let mut claimable: Vec<&mut QueueItem> = items
            .iter_mut()
            .filter(|item| match item.status {
                QueueStatus::Pending => true,
                QueueStatus::Processing => item
                    .processing_at
                    .is_some_and(|claimed| now - claimed > stale_after),
                _ => false,
            })
            .collect();
        claimable.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut claimed = Vec::new();
        for item in claimable.into_iter().take(limit) {
            item.status = QueueStatus::Processing;
            item.attempt_count += 1;
            item.processing_at = Some(now);
            claimed.push(item.clone());
        }

        Ok(claimed)
    }

    fn mark_completed(&self, id: &QueueItemId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut items = self.lock()?;
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or(StoreError::NotFound)?;

        item.status = QueueStatus::Completed;
        item.processed_at = Some(now);
        Ok(())
    }

    fn mark_failed_or_retry(
        &self,
        id: &QueueItemId,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<QueueStatus, StoreError> {
        let mut items = self.lock()?;
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or(StoreError::NotFound)?;

        item.last_error = Some(error.to_string());
        if item.attempt_count >= item.max_attempts {
            item.status = QueueStatus::Failed;
            item.processed_at = Some(now);
        } else {
            item.status = QueueStatus::Pending;
            item.processing_at = None;
        }

        Ok(item.status)
    }

    fn recent_enqueue_exists(
        &self,
        owner: &UserId,
        kind: QueueItemKind,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let items = self.lock()?;
        Ok(items
            .iter()
            .any(|item| &item.owner == owner && item.kind == kind && item.created_at >= since))
    }

    fn items_for_owner(&self, owner: &UserId) -> Result<Vec<QueueItem>, StoreError> {
        let items = self.lock()?;
        let mut owned: Vec<QueueItem> = items
            .iter()
            .filter(|item| &item.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }

    fn prune_finished(&self, before: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut items = self.lock()?;
        let before_len = items.len();
        items.retain(|item| {
            !(item.status.is_terminal() && item.processed_at.is_some_and(|at| at < before))
        });
        Ok(before_len - items.len())
    }
}
