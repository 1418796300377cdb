use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationRecord, AutomationSettings, PendingMatch};
use super::queue::{QueueItem, QueueItemId, QueueItemKind, QueueItemRequest, QueueStatus};
use crate::workflows::matching::{
    ExperienceRecord, JobPosting, MatchScoreBreakdown, ProfileRecord, SkillRecord, UserId,
};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Shared queue table. Claiming must be exclusive per item: the
/// `pending -> processing` transition is conditional, so an item handed to
/// one worker invocation is never handed to another in the same window.
pub trait QueueStore: Send + Sync {
    fn enqueue(
        &self,
        request: QueueItemRequest,
        now: DateTime<Utc>,
    ) -> Result<QueueItem, StoreError>;

    /// Claim up to `limit` claimable items, oldest first. Claimable means
    /// `pending`, or `processing` with a claim older than `stale_after`
    /// (a worker crashed mid-flight). Claiming increments `attempt_count`.
    fn claim_pending(
        &self,
        limit: usize,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Result<Vec<QueueItem>, StoreError>;

    fn mark_completed(&self, id: &QueueItemId, now: DateTime<Utc>) -> Result<(), StoreError>;

    /// Record a handler failure: back to `pending` while attempts remain,
    /// terminally `failed` otherwise. Returns the resulting status.
    fn mark_failed_or_retry(
        &self,
        id: &QueueItemId,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<QueueStatus, StoreError>;

    fn recent_enqueue_exists(
        &self,
        owner: &UserId,
        kind: QueueItemKind,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    fn items_for_owner(&self, owner: &UserId) -> Result<Vec<QueueItem>, StoreError>;

    /// Drop completed/failed items processed before `before`.
    fn prune_finished(&self, before: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Global job-posting table, deduplicated on URL.
pub trait JobStore: Send + Sync {
    /// Insert unless a posting with the same URL exists. Returns whether a
    /// new row was written.
    fn upsert(&self, posting: JobPosting) -> Result<bool, StoreError>;

    fn fetch(&self, url: &str) -> Result<Option<JobPosting>, StoreError>;

    /// Postings newer than `since` not yet scored for `user`, oldest first.
    fn recent_unscored(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<JobPosting>, StoreError>;

    /// Drop postings older than `cutoff`. Returns the number removed.
    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Persisted match evaluations per (user, job) pair.
pub trait MatchStore: Send + Sync {
    fn record(
        &self,
        user: &UserId,
        job: &JobPosting,
        breakdown: &MatchScoreBreakdown,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    fn pending_for(&self, user: &UserId) -> Result<Vec<PendingMatch>, StoreError>;

    fn matches_on(&self, user: &UserId, date: NaiveDate) -> Result<u32, StoreError>;
}

/// Submitted-application history; the authority for the daily cap.
pub trait ApplicationStore: Send + Sync {
    fn record(&self, record: ApplicationRecord) -> Result<(), StoreError>;

    fn count_on(&self, user: &UserId, date: NaiveDate) -> Result<u32, StoreError>;

    fn total_for(&self, user: &UserId) -> Result<u32, StoreError>;

    fn already_applied(&self, user: &UserId, job_url: &str) -> Result<bool, StoreError>;
}

/// Candidate profile plus its attached rows, as the match handler loads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    pub profile: ProfileRecord,
    pub skills: Vec<SkillRecord>,
    pub experiences: Vec<ExperienceRecord>,
}

pub trait ProfileStore: Send + Sync {
    fn snapshot(&self, user: &UserId) -> Result<Option<CandidateSnapshot>, StoreError>;
}

pub trait SettingsStore: Send + Sync {
    fn settings_for(&self, user: &UserId) -> Result<Option<AutomationSettings>, StoreError>;
}

/// Outbound notifications: match alerts, confirmations, daily summaries,
/// and terminal queue failures surfaced to the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    MatchFound {
        user: UserId,
        job_title: String,
        company: String,
        total_score: u8,
        job_url: String,
    },
    ApplicationSubmitted {
        user: UserId,
        job_title: String,
        company: String,
    },
    DailySummary {
        user: UserId,
        applications_today: u32,
        matches_today: u32,
        total_applications: u32,
    },
    AutomationFailed {
        user: UserId,
        kind: QueueItemKind,
        error: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// One portal search as the scrape handler issues it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub portal: String,
    pub query: String,
    pub location: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("unsupported portal: {0}")]
    UnsupportedPortal(String),
    #[error("portal unavailable: {0}")]
    Unavailable(String),
}

/// Browser-automation boundary for fetching postings. Implementations live
/// outside the core.
pub trait JobScraper: Send + Sync {
    fn scrape(&self, user: &UserId, request: &ScrapeRequest)
        -> Result<Vec<JobPosting>, ScrapeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("portal unavailable: {0}")]
    Unavailable(String),
}

/// Browser-automation boundary for submitting an application.
pub trait JobSubmitter: Send + Sync {
    fn submit(&self, user: &UserId, job: &JobPosting) -> Result<(), SubmitError>;
}
