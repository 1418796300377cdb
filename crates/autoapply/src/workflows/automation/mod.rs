//! Automation scheduling: per-tick enqueue policy, the queue item model,
//! collaborator store traits, and the externally ticked worker loop.

pub mod domain;
pub mod memory;
pub mod policy;
pub mod queue;
pub mod store;
pub mod worker;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationRecord, ApplicationStatus, ApplyWindow, AutomationSettings, PendingMatch,
    SettingsError, UserTickContext,
};
pub use memory::InMemoryQueueStore;
pub use policy::{cleanup_request, daily_summary_requests, evaluate_tick};
pub use queue::{
    ApplyPayload, QueueItem, QueueItemId, QueueItemKind, QueueItemRequest, QueueStatus,
    ScrapePayload, DEFAULT_MAX_ATTEMPTS,
};
pub use store::{
    ApplicationStore, CandidateSnapshot, JobScraper, JobStore, JobSubmitter, MatchStore,
    Notification, NotificationPublisher, NotifyError, ProfileStore, QueueStore, ScrapeError,
    ScrapeRequest, SettingsStore, StoreError, SubmitError,
};
pub use worker::{BatchReport, HandlerError, QueueWorker, WorkerContext, HIGH_MATCH_THRESHOLD};
