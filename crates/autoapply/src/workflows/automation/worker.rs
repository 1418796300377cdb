use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{ApplicationRecord, ApplicationStatus};
use super::queue::{ApplyPayload, QueueItem, QueueItemKind, QueueStatus, ScrapePayload};
use super::store::{
    ApplicationStore, JobScraper, JobStore, JobSubmitter, MatchStore, Notification,
    NotificationPublisher, NotifyError, ProfileStore, ScrapeError, ScrapeRequest, SettingsStore,
    StoreError, SubmitError, QueueStore,
};
use crate::config::QueueConfig;
use crate::workflows::matching::{normalize_candidate, score_match};

/// Match totals at or above this trigger an immediate notification.
pub const HIGH_MATCH_THRESHOLD: u8 = 80;

const MATCH_WINDOW_DAYS: i64 = 7;
const MATCH_BATCH_LIMIT: usize = 100;
const JOB_RETENTION_DAYS: i64 = 90;
const QUEUE_RETENTION_DAYS: i64 = 30;

/// Error raised by a type-specific handler. Caught per item by the worker
/// loop and recorded as the item's `last_error`.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("candidate profile not found")]
    MissingProfile,
    #[error("job posting not found: {0}")]
    MissingJob(String),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Every collaborator the worker needs, behind trait objects so the service
/// binary, demos, and tests can wire in whatever implementations they have.
#[derive(Clone)]
pub struct WorkerContext {
    pub queue: Arc<dyn QueueStore>,
    pub jobs: Arc<dyn JobStore>,
    pub matches: Arc<dyn MatchStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub notifier: Arc<dyn NotificationPublisher>,
    pub scraper: Arc<dyn JobScraper>,
    pub submitter: Arc<dyn JobSubmitter>,
}

/// Outcome counts for one externally driven worker tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub claimed: usize,
    pub completed: usize,
    pub retried: usize,
    pub failed: usize,
}

/// Externally ticked batch worker. No hidden timers or module state: every
/// call to [`QueueWorker::process_batch`] claims one bounded FIFO batch,
/// runs each item's handler, and settles each item's status before
/// returning.
pub struct QueueWorker {
    config: QueueConfig,
    context: WorkerContext,
}

impl QueueWorker {
    pub fn new(config: QueueConfig, context: WorkerContext) -> Self {
        Self { config, context }
    }

    pub fn process_batch(&self, now: DateTime<Local>) -> Result<BatchReport, StoreError> {
        let now_utc = now.with_timezone(&Utc);
        let claimed = self.context.queue.claim_pending(
            self.config.batch_size,
            now_utc,
            Duration::minutes(self.config.stale_claim_minutes),
        )?;

        let mut report = BatchReport {
            claimed: claimed.len(),
            ..BatchReport::default()
        };

        for item in claimed {
            match self.handle_item(&item, now) {
                Ok(()) => {
                    self.context.queue.mark_completed(&item.id, now_utc)?;
                    report.completed += 1;
                }
                Err(error) => {
                    warn!(
                        item = %item.id.0,
                        kind = item.kind.label(),
                        attempt = item.attempt_count,
                        %error,
                        "queue item handler failed"
                    );
                    let status = self.context.queue.mark_failed_or_retry(
                        &item.id,
                        &error.to_string(),
                        now_utc,
                    )?;
                    if status == QueueStatus::Failed {
                        report.failed += 1;
                        self.notify_terminal_failure(&item, &error);
                    } else {
                        report.retried += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    fn notify_terminal_failure(&self, item: &QueueItem, error: &HandlerError) {
        let notification = Notification::AutomationFailed {
            user: item.owner.clone(),
            kind: item.kind,
            error: error.to_string(),
        };
        if let Err(notify_error) = self.context.notifier.publish(notification) {
            warn!(item = %item.id.0, %notify_error, "failed to surface terminal queue failure");
        }
    }

    fn handle_item(&self, item: &QueueItem, now: DateTime<Local>) -> Result<(), HandlerError> {
        match item.kind {
            QueueItemKind::Scrape => self.handle_scrape(item),
            QueueItemKind::Match => self.handle_match(item, now),
            QueueItemKind::Apply => self.handle_apply(item, now),
            QueueItemKind::Notify => self.handle_notify(item, now),
            QueueItemKind::Cleanup => self.handle_cleanup(now),
        }
    }

    fn handle_scrape(&self, item: &QueueItem) -> Result<(), HandlerError> {
        let payload: ScrapePayload = serde_json::from_value(item.payload.clone())?;
        let request = ScrapeRequest {
            portal: payload.portal,
            query: payload.query,
            location: payload.location,
        };

        let postings = self.context.scraper.scrape(&item.owner, &request)?;
        let mut inserted = 0;
        for posting in postings {
            if self.context.jobs.upsert(posting)? {
                inserted += 1;
            }
        }

        info!(
            user = %item.owner.0,
            portal = %request.portal,
            inserted,
            "scrape completed"
        );
        Ok(())
    }

    fn handle_match(&self, item: &QueueItem, now: DateTime<Local>) -> Result<(), HandlerError> {
        let snapshot = self
            .context
            .profiles
            .snapshot(&item.owner)?
            .ok_or(HandlerError::MissingProfile)?;

        let criteria = normalize_candidate(
            &snapshot.profile,
            &snapshot.skills,
            &snapshot.experiences,
            now.date_naive(),
        );

        let now_utc = now.with_timezone(&Utc);
        let since = now_utc - Duration::days(MATCH_WINDOW_DAYS);
        let postings = self
            .context
            .jobs
            .recent_unscored(&item.owner, since, MATCH_BATCH_LIMIT)?;

        let scored = postings.len();
        for posting in postings {
            let breakdown = score_match(&posting, &criteria);
            self.context
                .matches
                .record(&item.owner, &posting, &breakdown, now_utc)?;

            if breakdown.total_score >= HIGH_MATCH_THRESHOLD {
                self.context.notifier.publish(Notification::MatchFound {
                    user: item.owner.clone(),
                    job_title: posting.title.clone(),
                    company: posting.company.clone(),
                    total_score: breakdown.total_score,
                    job_url: posting.url.clone(),
                })?;
            }
        }

        info!(user = %item.owner.0, scored, "match refresh completed");
        Ok(())
    }

    fn handle_apply(&self, item: &QueueItem, now: DateTime<Local>) -> Result<(), HandlerError> {
        let payload: ApplyPayload = serde_json::from_value(item.payload.clone())?;

        // Second guard against double-enqueued apply items: re-verify right
        // before submission, since the evaluator may have raced.
        if self
            .context
            .applications
            .already_applied(&item.owner, &payload.job_url)?
        {
            debug!(user = %item.owner.0, job = %payload.job_url, "apply skipped: already applied");
            return Ok(());
        }

        if let Some(settings) = self.context.settings.settings_for(&item.owner)? {
            let applications_today = self
                .context
                .applications
                .count_on(&item.owner, now.date_naive())?;
            if applications_today >= settings.max_applications_per_day {
                debug!(user = %item.owner.0, "apply skipped: daily cap reached");
                return Ok(());
            }
        }

        let job = self
            .context
            .jobs
            .fetch(&payload.job_url)?
            .ok_or_else(|| HandlerError::MissingJob(payload.job_url.clone()))?;

        self.context.submitter.submit(&item.owner, &job)?;

        self.context.applications.record(ApplicationRecord {
            user: item.owner.clone(),
            job_url: job.url.clone(),
            status: ApplicationStatus::Applied,
            applied_at: now.with_timezone(&Utc),
        })?;

        self.context
            .notifier
            .publish(Notification::ApplicationSubmitted {
                user: item.owner.clone(),
                job_title: job.title.clone(),
                company: job.company.clone(),
            })?;

        info!(user = %item.owner.0, job = %job.url, "application submitted");
        Ok(())
    }

    fn handle_notify(&self, item: &QueueItem, now: DateTime<Local>) -> Result<(), HandlerError> {
        let today = now.date_naive();
        let applications_today = self.context.applications.count_on(&item.owner, today)?;
        let matches_today = self.context.matches.matches_on(&item.owner, today)?;
        let total_applications = self.context.applications.total_for(&item.owner)?;

        self.context.notifier.publish(Notification::DailySummary {
            user: item.owner.clone(),
            applications_today,
            matches_today,
            total_applications,
        })?;
        Ok(())
    }

    fn handle_cleanup(&self, now: DateTime<Local>) -> Result<(), HandlerError> {
        let now_utc = now.with_timezone(&Utc);

        let jobs_removed = self
            .context
            .jobs
            .prune_older_than(now_utc - Duration::days(JOB_RETENTION_DAYS))?;
        let queue_removed = self
            .context
            .queue
            .prune_finished(now_utc - Duration::days(QUEUE_RETENTION_DAYS))?;

        info!(jobs_removed, queue_removed, "cleanup completed");
        Ok(())
    }
}
