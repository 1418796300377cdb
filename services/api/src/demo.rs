use crate::infra::{
    default_automation_settings, InMemoryDataStore, LoggingNotifier, LoggingSubmitter,
    StubPortalScraper,
};
use autoapply::config::QueueConfig;
use autoapply::error::AppError;
use autoapply::workflows::automation::{
    cleanup_request, daily_summary_requests, evaluate_tick, ApplicationStore, CandidateSnapshot,
    InMemoryQueueStore, MatchStore, QueueItemKind, QueueStore, QueueWorker, UserTickContext,
    WorkerContext,
};
use autoapply::workflows::matching::{
    score_match, CandidateCriteria, JobPosting, ProfileRecord, SalaryExpectation, SkillRecord,
    UserId,
};
use chrono::{Duration, Local, Utc};
use clap::Args;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Job title
    #[arg(long)]
    pub(crate) title: String,
    /// Company name
    #[arg(long, default_value = "Unknown")]
    pub(crate) company: String,
    /// Job location
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Job description text
    #[arg(long)]
    pub(crate) description: Option<String>,
    /// Job requirements text
    #[arg(long)]
    pub(crate) requirements: Option<String>,
    /// Salary range text, e.g. "$120k-$150k"
    #[arg(long)]
    pub(crate) salary_range: Option<String>,
    /// Candidate skills, comma separated
    #[arg(long, value_delimiter = ',')]
    pub(crate) skills: Vec<String>,
    /// Candidate years of experience
    #[arg(long, default_value_t = 0.0)]
    pub(crate) years: f32,
    /// Preferred job title (repeatable)
    #[arg(long = "preferred-title")]
    pub(crate) preferred_titles: Vec<String>,
    /// Preferred location (repeatable)
    #[arg(long = "preferred-location")]
    pub(crate) preferred_locations: Vec<String>,
    /// Desired salary lower bound
    #[arg(long)]
    pub(crate) salary_min: Option<u32>,
    /// Desired salary upper bound
    #[arg(long)]
    pub(crate) salary_max: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Number of automation ticks to run
    #[arg(long, default_value_t = 2)]
    pub(crate) ticks: u32,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let job = JobPosting {
        title: args.title,
        company: args.company,
        location: args.location,
        description: args.description,
        requirements: args.requirements,
        salary_range: args.salary_range,
        posted_at: Utc::now(),
        url: "cli://score".to_string(),
    };
    let criteria = CandidateCriteria {
        skills: args.skills,
        experience_years: args.years,
        preferred_titles: args.preferred_titles,
        preferred_locations: args.preferred_locations,
        salary_expectation: SalaryExpectation {
            min: args.salary_min,
            max: args.salary_max,
        },
    };

    let breakdown = score_match(&job, &criteria);

    println!("Match breakdown for '{}'", job.title);
    println!("  skills     {:>3}", breakdown.skills_match);
    println!("  title      {:>3}", breakdown.title_match);
    println!("  location   {:>3}", breakdown.location_match);
    println!("  experience {:>3}", breakdown.experience_match);
    println!("  salary     {:>3}", breakdown.salary_match);
    println!("  total      {:>3}", breakdown.total_score);
    if !breakdown.matched_skills.is_empty() {
        println!("  matched skills: {}", breakdown.matched_skills.join(", "));
    }
    if !breakdown.missing_skills.is_empty() {
        println!("  missing skills: {}", breakdown.missing_skills.join(", "));
    }

    Ok(())
}

fn demo_snapshot() -> CandidateSnapshot {
    CandidateSnapshot {
        profile: ProfileRecord {
            full_name: Some("Demo Candidate".to_string()),
            years_of_experience: Some(5.0),
            desired_job_titles: Some(vec!["Backend Engineer".to_string()]),
            preferred_locations: Some(vec!["Remote".to_string()]),
            desired_salary_min: Some(100_000),
            desired_salary_max: Some(160_000),
        },
        skills: ["Python", "AWS", "PostgreSQL"]
            .into_iter()
            .map(|name| SkillRecord {
                skill_name: name.to_string(),
                proficiency_level: None,
                years_of_experience: None,
            })
            .collect(),
        experiences: Vec::new(),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let owner = UserId("demo-user".to_string());
    let queue = Arc::new(InMemoryQueueStore::new());
    let data = InMemoryDataStore::default();
    data.seed_profile(&owner, demo_snapshot())?;
    data.seed_settings(&owner, default_automation_settings())?;

    let context = WorkerContext {
        queue: queue.clone(),
        jobs: Arc::new(data.clone()),
        matches: Arc::new(data.clone()),
        applications: Arc::new(data.clone()),
        profiles: Arc::new(data.clone()),
        settings: Arc::new(data.clone()),
        notifier: Arc::new(LoggingNotifier),
        scraper: Arc::new(StubPortalScraper),
        submitter: Arc::new(LoggingSubmitter),
    };
    let worker = QueueWorker::new(QueueConfig::default(), context);

    println!("AutoApply demo: {} tick(s) for '{}'", args.ticks, owner.0);

    for tick in 1..=args.ticks {
        let now = Local::now();
        let now_utc = now.with_timezone(&Utc);
        let today = now.date_naive();
        let settings = default_automation_settings();

        let pending = data.pending_for(&owner)?;
        let applied_job_urls: BTreeSet<String> = pending
            .iter()
            .filter(|m| {
                data.already_applied(&owner, &m.job_url)
                    .unwrap_or(false)
            })
            .map(|m| m.job_url.clone())
            .collect();

        let scrape_window = now_utc - Duration::hours(i64::from(settings.scrape_frequency_hours));
        let last_scrape_enqueued_at = if queue
            .recent_enqueue_exists(&owner, QueueItemKind::Scrape, scrape_window)?
        {
            Some(now_utc)
        } else {
            None
        };

        let user_context = UserTickContext {
            user: owner.clone(),
            settings,
            applications_today: data.count_on(&owner, today)?,
            applied_job_urls,
            last_scrape_enqueued_at,
            last_match_enqueued_at: None,
            pending_matches: pending,
            desired_job_titles: vec!["Backend Engineer".to_string()],
            preferred_locations: vec!["Remote".to_string()],
        };

        let requests = evaluate_tick(now, &[user_context]);
        let enqueued = requests.len();
        for request in requests {
            queue.enqueue(request, now.with_timezone(&Utc))?;
        }

        let report = worker.process_batch(now)?;
        println!(
            "tick {tick}: enqueued {enqueued}, claimed {}, completed {}, retried {}, failed {}",
            report.claimed, report.completed, report.retried, report.failed
        );
    }

    // End-of-day pass: one summary per user plus global maintenance.
    let now = Local::now();
    for request in daily_summary_requests(&[owner.clone()]) {
        queue.enqueue(request, now.with_timezone(&Utc))?;
    }
    queue.enqueue(cleanup_request(), now.with_timezone(&Utc))?;
    worker.process_batch(now)?;

    let today = now.date_naive();
    println!(
        "summary: {} match(es) today, {} application(s) today, {} total",
        data.matches_on(&owner, today)?,
        data.count_on(&owner, today)?,
        data.total_for(&owner)?
    );

    Ok(())
}
