use autoapply::workflows::automation::{
    ApplicationRecord, ApplicationStore, AutomationSettings, CandidateSnapshot, JobScraper,
    JobStore, JobSubmitter, MatchStore, Notification, NotificationPublisher, NotifyError,
    PendingMatch, ProfileStore, ScrapeError, ScrapeRequest, SettingsStore, StoreError,
    SubmitError,
};
use autoapply::workflows::matching::{JobPosting, MatchScoreBreakdown, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

struct MatchEntry {
    user: UserId,
    pending: PendingMatch,
    recorded_at: DateTime<Utc>,
}

#[derive(Default)]
struct DataInner {
    jobs: HashMap<String, JobPosting>,
    matches: Vec<MatchEntry>,
    applications: Vec<ApplicationRecord>,
    profiles: HashMap<String, CandidateSnapshot>,
    settings: HashMap<String, AutomationSettings>,
}

/// Backing tables for every store trait except the queue. One struct keeps
/// the "not yet scored" query straightforward: it needs both the job table
/// and the match table.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDataStore {
    inner: Arc<Mutex<DataInner>>,
}

impl InMemoryDataStore {
    fn lock(&self) -> Result<MutexGuard<'_, DataInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("data mutex poisoned".to_string()))
    }

    pub(crate) fn seed_profile(
        &self,
        user: &UserId,
        snapshot: CandidateSnapshot,
    ) -> Result<(), StoreError> {
        self.lock()?.profiles.insert(user.0.clone(), snapshot);
        Ok(())
    }

    pub(crate) fn seed_settings(
        &self,
        user: &UserId,
        settings: AutomationSettings,
    ) -> Result<(), StoreError> {
        self.lock()?.settings.insert(user.0.clone(), settings);
        Ok(())
    }
}

impl JobStore for InMemoryDataStore {
    fn upsert(&self, posting: JobPosting) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        if inner.jobs.contains_key(&posting.url) {
            return Ok(false);
        }
        inner.jobs.insert(posting.url.clone(), posting);
        Ok(true)
    }

    fn fetch(&self, url: &str) -> Result<Option<JobPosting>, StoreError> {
        Ok(self.lock()?.jobs.get(url).cloned())
    }

    fn recent_unscored(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<JobPosting>, StoreError> {
        let inner = self.lock()?;
        let mut postings: Vec<JobPosting> = inner
            .jobs
            .values()
            .filter(|job| job.posted_at > since)
            .filter(|job| {
                !inner
                    .matches
                    .iter()
                    .any(|entry| &entry.user == user && entry.pending.job_url == job.url)
            })
            .cloned()
            .collect();
        postings.sort_by(|a, b| a.posted_at.cmp(&b.posted_at));
        postings.truncate(limit);
        Ok(postings)
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.jobs.len();
        inner.jobs.retain(|_, job| job.posted_at >= cutoff);
        Ok(before - inner.jobs.len())
    }
}

impl MatchStore for InMemoryDataStore {
    fn record(
        &self,
        user: &UserId,
        job: &JobPosting,
        breakdown: &MatchScoreBreakdown,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.lock()?.matches.push(MatchEntry {
            user: user.clone(),
            pending: PendingMatch {
                job_url: job.url.clone(),
                company: job.company.clone(),
                total_score: breakdown.total_score,
            },
            recorded_at: now,
        });
        Ok(())
    }

    fn pending_for(&self, user: &UserId) -> Result<Vec<PendingMatch>, StoreError> {
        Ok(self
            .lock()?
            .matches
            .iter()
            .filter(|entry| &entry.user == user)
            .map(|entry| entry.pending.clone())
            .collect())
    }

    fn matches_on(&self, user: &UserId, date: NaiveDate) -> Result<u32, StoreError> {
        Ok(self
            .lock()?
            .matches
            .iter()
            .filter(|entry| &entry.user == user && entry.recorded_at.date_naive() == date)
            .count() as u32)
    }
}

impl ApplicationStore for InMemoryDataStore {
    fn record(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        self.lock()?.applications.push(record);
        Ok(())
    }

    fn count_on(&self, user: &UserId, date: NaiveDate) -> Result<u32, StoreError> {
        Ok(self
            .lock()?
            .applications
            .iter()
            .filter(|a| &a.user == user && a.applied_at.date_naive() == date)
            .count() as u32)
    }

    fn total_for(&self, user: &UserId) -> Result<u32, StoreError> {
        Ok(self
            .lock()?
            .applications
            .iter()
            .filter(|a| &a.user == user)
            .count() as u32)
    }

    fn already_applied(&self, user: &UserId, job_url: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()?
            .applications
            .iter()
            .any(|a| &a.user == user && a.job_url == job_url))
    }
}

impl ProfileStore for InMemoryDataStore {
    fn snapshot(&self, user: &UserId) -> Result<Option<CandidateSnapshot>, StoreError> {
        Ok(self.lock()?.profiles.get(&user.0).cloned())
    }
}

impl SettingsStore for InMemoryDataStore {
    fn settings_for(&self, user: &UserId) -> Result<Option<AutomationSettings>, StoreError> {
        Ok(self.lock()?.settings.get(&user.0).cloned())
    }
}

/// Emits each notification as a structured log line. A real deployment
/// would put an email or push transport here.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotifier;

impl NotificationPublisher for LoggingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        match notification {
            Notification::MatchFound {
                user,
                job_title,
                company,
                total_score,
                job_url,
            } => info!(
                user = %user.0,
                %job_title,
                %company,
                total_score,
                %job_url,
                "high match found"
            ),
            Notification::ApplicationSubmitted {
                user,
                job_title,
                company,
            } => info!(user = %user.0, %job_title, %company, "application submitted"),
            Notification::DailySummary {
                user,
                applications_today,
                matches_today,
                total_applications,
            } => info!(
                user = %user.0,
                applications_today,
                matches_today,
                total_applications,
                "daily summary"
            ),
            Notification::AutomationFailed { user, kind, error } => info!(
                user = %user.0,
                kind = kind.label(),
                %error,
                "automation task failed"
            ),
        }
        Ok(())
    }
}

const SUPPORTED_PORTALS: &[&str] = &["linkedin", "indeed"];

/// Stand-in for the browser-automation scraper: fabricates a small page of
/// plausible postings for each supported portal search.
#[derive(Default, Clone)]
pub(crate) struct StubPortalScraper;

impl JobScraper for StubPortalScraper {
    fn scrape(
        &self,
        user: &UserId,
        request: &ScrapeRequest,
    ) -> Result<Vec<JobPosting>, ScrapeError> {
        if !SUPPORTED_PORTALS.contains(&request.portal.as_str()) {
            return Err(ScrapeError::UnsupportedPortal(request.portal.clone()));
        }

        info!(
            user = %user.0,
            portal = %request.portal,
            query = %request.query,
            "scraping portal"
        );

        let now = Utc::now();
        let slug = request
            .query
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");

        Ok(vec![
            JobPosting {
                title: request.query.clone(),
                company: "Initech".to_string(),
                location: Some(request.location.clone()),
                description: Some(format!("{} role sourced from {}", request.query, request.portal)),
                requirements: Some("5+ years experience with Python, AWS, PostgreSQL".to_string()),
                salary_range: Some("$120k-$150k".to_string()),
                posted_at: now,
                url: format!("https://{}.example.com/jobs/{slug}-1", request.portal),
            },
            JobPosting {
                title: format!("Senior {}", request.query),
                company: "Globex".to_string(),
                location: Some("Remote".to_string()),
                description: Some(format!("Senior {} opening", request.query)),
                requirements: Some("7+ years experience. TypeScript, React, Node".to_string()),
                salary_range: Some("$150k-$180k".to_string()),
                posted_at: now,
                url: format!("https://{}.example.com/jobs/{slug}-2", request.portal),
            },
        ])
    }
}

/// Accepts every submission and logs it; the browser-automation submitter
/// lives outside this service.
#[derive(Default, Clone)]
pub(crate) struct LoggingSubmitter;

impl JobSubmitter for LoggingSubmitter {
    fn submit(&self, user: &UserId, job: &JobPosting) -> Result<(), SubmitError> {
        info!(user = %user.0, job = %job.url, company = %job.company, "submitting application");
        Ok(())
    }
}

pub(crate) fn default_automation_settings() -> AutomationSettings {
    AutomationSettings {
        auto_apply_enabled: true,
        auto_scrape_enabled: true,
        ..AutomationSettings::default()
    }
}
