use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::workflows::automation::domain::{
    ApplicationRecord, AutomationSettings, PendingMatch, UserTickContext,
};
use crate::workflows::automation::memory::InMemoryQueueStore;
use crate::workflows::automation::store::{
    ApplicationStore, CandidateSnapshot, JobScraper, JobStore, JobSubmitter, MatchStore,
    Notification, NotificationPublisher, NotifyError, ProfileStore, ScrapeError, ScrapeRequest,
    SettingsStore, StoreError, SubmitError,
};
use crate::workflows::automation::worker::WorkerContext;
use crate::workflows::matching::{
    JobPosting, MatchScoreBreakdown, ProfileRecord, SkillRecord, UserId,
};

pub(super) fn user(name: &str) -> UserId {
    UserId(name.to_string())
}

/// A Monday inside the default 9-17 apply window.
pub(super) fn monday_at(hour: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
        .single()
        .expect("valid local time")
}

pub(super) fn saturday_at(hour: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 3, 7, hour, 0, 0)
        .single()
        .expect("valid local time")
}

/// Settings with all three automations switched on.
pub(super) fn enabled_settings() -> AutomationSettings {
    AutomationSettings {
        auto_apply_enabled: true,
        auto_scrape_enabled: true,
        ..AutomationSettings::default()
    }
}

pub(super) fn tick_context(name: &str) -> UserTickContext {
    UserTickContext {
        user: user(name),
        settings: enabled_settings(),
        applications_today: 0,
        applied_job_urls: Default::default(),
        last_scrape_enqueued_at: None,
        last_match_enqueued_at: None,
        pending_matches: Vec::new(),
        desired_job_titles: vec!["Backend Engineer".to_string()],
        preferred_locations: vec!["Remote".to_string()],
    }
}

pub(super) fn pending(url: &str, company: &str, total_score: u8) -> PendingMatch {
    PendingMatch {
        job_url: url.to_string(),
        company: company.to_string(),
        total_score,
    }
}

pub(super) fn posting(title: &str, url: &str, posted_at: DateTime<Utc>) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        company: "Initech".to_string(),
        location: Some("Remote".to_string()),
        description: None,
        requirements: Some("5+ years experience with Python, AWS, PostgreSQL".to_string()),
        salary_range: Some("$120k-$150k".to_string()),
        posted_at,
        url: url.to_string(),
    }
}

/// Snapshot whose criteria score highly against [`posting`].
pub(super) fn backend_snapshot() -> CandidateSnapshot {
    CandidateSnapshot {
        profile: ProfileRecord {
            full_name: Some("Sam Carter".to_string()),
            years_of_experience: Some(5.0),
            desired_job_titles: Some(vec!["Backend Engineer".to_string()]),
            preferred_locations: Some(vec!["San Francisco".to_string()]),
            desired_salary_min: Some(100_000),
            desired_salary_max: Some(160_000),
        },
        skills: vec![
            SkillRecord {
                skill_name: "Python".to_string(),
                proficiency_level: None,
                years_of_experience: None,
            },
            SkillRecord {
                skill_name: "AWS".to_string(),
                proficiency_level: None,
                years_of_experience: None,
            },
        ],
        experiences: Vec::new(),
    }
}

#[derive(Default)]
struct StoreInner {
    jobs: Vec<JobPosting>,
    matches: Vec<MatchRow>,
    applications: Vec<ApplicationRecord>,
    profiles: HashMap<String, CandidateSnapshot>,
    settings: HashMap<String, AutomationSettings>,
}

struct MatchRow {
    user: UserId,
    job_url: String,
    recorded_at: DateTime<Utc>,
}

/// One backing table set implementing every data-store trait; tests hand the
/// same `Arc` to the worker once per trait.
#[derive(Default)]
pub(super) struct MemoryStores {
    inner: Mutex<StoreInner>,
}

impl MemoryStores {
    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("store lock")
    }

    pub(super) fn insert_job(&self, posting: JobPosting) {
        self.lock().jobs.push(posting);
    }

    pub(super) fn insert_profile(&self, user: &UserId, snapshot: CandidateSnapshot) {
        self.lock().profiles.insert(user.0.clone(), snapshot);
    }

    pub(super) fn insert_settings(&self, user: &UserId, settings: AutomationSettings) {
        self.lock().settings.insert(user.0.clone(), settings);
    }

    pub(super) fn insert_application(&self, record: ApplicationRecord) {
        self.lock().applications.push(record);
    }

    pub(super) fn applications_for(&self, user: &UserId) -> Vec<ApplicationRecord> {
        self.lock()
            .applications
            .iter()
            .filter(|a| &a.user == user)
            .cloned()
            .collect()
    }

    pub(super) fn job_count(&self) -> usize {
        self.lock().jobs.len()
    }
}

impl JobStore for MemoryStores {
    fn upsert(&self, posting: JobPosting) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        if inner.jobs.iter().any(|j| j.url == posting.url) {
            return Ok(false);
        }
        inner.jobs.push(posting);
        Ok(true)
    }

    fn fetch(&self, url: &str) -> Result<Option<JobPosting>, StoreError> {
        Ok(self.lock().jobs.iter().find(|j| j.url == url).cloned())
    }

    fn recent_unscored(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<JobPosting>, StoreError> {
        let inner = self.lock();
        let mut postings: Vec<JobPosting> = inner
            .jobs
            .iter()
            .filter(|j| j.posted_at > since)
            .filter(|j| {
                !inner
                    .matches
                    .iter()
                    .any(|m| &m.user == user && m.job_url == j.url)
            })
            .cloned()
            .collect();
        postings.sort_by(|a, b| a.posted_at.cmp(&b.posted_at));
        postings.truncate(limit);
        Ok(postings)
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut inner = self.lock();
        let before = inner.jobs.len();
        inner.jobs.retain(|j| j.posted_at >= cutoff);
        Ok(before - inner.jobs.len())
    }
}

impl MatchStore for MemoryStores {
    fn record(
        &self,
        user: &UserId,
        job: &JobPosting,
        _breakdown: &MatchScoreBreakdown,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.lock().matches.push(MatchRow {
            user: user.clone(),
            job_url: job.url.clone(),
            recorded_at: now,
        });
        Ok(())
    }

    fn pending_for(&self, user: &UserId) -> Result<Vec<PendingMatch>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .matches
            .iter()
            .filter(|m| &m.user == user)
            .map(|m| pending(&m.job_url, "Initech", 87))
            .collect())
    }

    fn matches_on(&self, user: &UserId, date: NaiveDate) -> Result<u32, StoreError> {
        Ok(self
            .lock()
            .matches
            .iter()
            .filter(|m| &m.user == user && m.recorded_at.date_naive() == date)
            .count() as u32)
    }
}

impl ApplicationStore for MemoryStores {
    fn record(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        self.lock().applications.push(record);
        Ok(())
    }

    fn count_on(&self, user: &UserId, date: NaiveDate) -> Result<u32, StoreError> {
        Ok(self
            .lock()
            .applications
            .iter()
            .filter(|a| &a.user == user && a.applied_at.date_naive() == date)
            .count() as u32)
    }

    fn total_for(&self, user: &UserId) -> Result<u32, StoreError> {
        Ok(self
            .lock()
            .applications
            .iter()
            .filter(|a| &a.user == user)
            .count() as u32)
    }

    fn already_applied(&self, user: &UserId, job_url: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .applications
            .iter()
            .any(|a| &a.user == user && a.job_url == job_url))
    }
}

impl ProfileStore for MemoryStores {
    fn snapshot(&self, user: &UserId) -> Result<Option<CandidateSnapshot>, StoreError> {
        Ok(self.lock().profiles.get(&user.0).cloned())
    }
}

impl SettingsStore for MemoryStores {
    fn settings_for(&self, user: &UserId) -> Result<Option<AutomationSettings>, StoreError> {
        Ok(self.lock().settings.get(&user.0).cloned())
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(super) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

impl NotificationPublisher for RecordingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().expect("notifier lock").push(notification);
        Ok(())
    }
}

pub(super) struct StubScraper {
    pub(super) postings: Vec<JobPosting>,
    pub(super) fail: bool,
}

impl JobScraper for StubScraper {
    fn scrape(
        &self,
        _user: &UserId,
        _request: &ScrapeRequest,
    ) -> Result<Vec<JobPosting>, ScrapeError> {
        if self.fail {
            return Err(ScrapeError::Unavailable("portal down".to_string()));
        }
        Ok(self.postings.clone())
    }
}

#[derive(Default)]
pub(super) struct StubSubmitter {
    pub(super) reject: bool,
}

impl JobSubmitter for StubSubmitter {
    fn submit(&self, _user: &UserId, _job: &JobPosting) -> Result<(), SubmitError> {
        if self.reject {
            return Err(SubmitError::Rejected("portal said no".to_string()));
        }
        Ok(())
    }
}

/// Worker harness bundling the queue, tables, and doubles a test pokes at.
pub(super) struct Harness {
    pub(super) queue: Arc<InMemoryQueueStore>,
    pub(super) stores: Arc<MemoryStores>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) context: WorkerContext,
}

pub(super) fn harness_with(scraper: StubScraper, submitter: StubSubmitter) -> Harness {
    let queue = Arc::new(InMemoryQueueStore::new());
    let stores = Arc::new(MemoryStores::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let context = WorkerContext {
        queue: queue.clone(),
        jobs: stores.clone(),
        matches: stores.clone(),
        applications: stores.clone(),
        profiles: stores.clone(),
        settings: stores.clone(),
        notifier: notifier.clone(),
        scraper: Arc::new(scraper),
        submitter: Arc::new(submitter),
    };

    Harness {
        queue,
        stores,
        notifier,
        context,
    }
}

pub(super) fn harness() -> Harness {
    harness_with(
        StubScraper {
            postings: Vec::new(),
            fail: false,
        },
        StubSubmitter::default(),
    )
}
