use chrono::{Duration, Utc};
use serde_json::json;

use super::common::*;
use crate::config::QueueConfig;
use crate::workflows::automation::domain::{ApplicationRecord, ApplicationStatus};
use crate::workflows::automation::queue::{QueueItemKind, QueueItemRequest, QueueStatus};
use crate::workflows::automation::store::{Notification, QueueStore};
use crate::workflows::automation::worker::{BatchReport, QueueWorker};

fn worker(harness: &Harness) -> QueueWorker {
    QueueWorker::new(QueueConfig::default(), harness.context.clone())
}

fn scrape_request(owner: &str) -> QueueItemRequest {
    QueueItemRequest::with_payload(
        QueueItemKind::Scrape,
        user(owner),
        json!({
            "portal": "linkedin",
            "query": "Backend Engineer",
            "location": "Remote",
        }),
    )
}

fn apply_request(owner: &str, url: &str) -> QueueItemRequest {
    QueueItemRequest::with_payload(QueueItemKind::Apply, user(owner), json!({ "job_url": url }))
}

#[test]
fn scrape_items_store_new_postings_and_skip_known_urls() {
    let now = monday_at(10);
    let now_utc = now.with_timezone(&Utc);

    let known = posting("Backend Engineer", "https://jobs.example.com/known", now_utc);
    let fresh = posting("Platform Engineer", "https://jobs.example.com/fresh", now_utc);
    let harness = harness_with(
        StubScraper {
            postings: vec![known.clone(), fresh],
            fail: false,
        },
        StubSubmitter::default(),
    );
    harness.stores.insert_job(known);

    harness
        .queue
        .enqueue(scrape_request("alice"), now_utc)
        .expect("enqueue");

    let report = worker(&harness).process_batch(now).expect("batch");
    assert_eq!(
        report,
        BatchReport {
            claimed: 1,
            completed: 1,
            retried: 0,
            failed: 0,
        }
    );
    assert_eq!(harness.stores.job_count(), 2);
}

#[test]
fn match_items_score_recent_postings_and_alert_on_high_matches() {
    let now = monday_at(10);
    let now_utc = now.with_timezone(&Utc);
    let harness = harness();
    let owner = user("alice");

    harness.stores.insert_profile(&owner, backend_snapshot());
    harness.stores.insert_job(posting(
        "Backend Engineer",
        "https://jobs.example.com/backend-1",
        now_utc - Duration::days(1),
    ));
    // Outside the seven-day scoring window.
    harness.stores.insert_job(posting(
        "Backend Engineer",
        "https://jobs.example.com/ancient",
        now_utc - Duration::days(30),
    ));

    harness
        .queue
        .enqueue(
            QueueItemRequest::new(QueueItemKind::Match, owner.clone()),
            now_utc,
        )
        .expect("enqueue");

    let report = worker(&harness).process_batch(now).expect("batch");
    assert_eq!(report.completed, 1);

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Notification::MatchFound {
            user: notified,
            total_score,
            job_url,
            ..
        } => {
            assert_eq!(notified, &owner);
            assert_eq!(*total_score, 87);
            assert_eq!(job_url, "https://jobs.example.com/backend-1");
        }
        other => panic!("unexpected notification: {other:?}"),
    }

    // The posting is now scored; a second refresh finds nothing new.
    harness
        .queue
        .enqueue(QueueItemRequest::new(QueueItemKind::Match, owner), now_utc)
        .expect("enqueue");
    worker(&harness).process_batch(now).expect("batch");
    assert_eq!(harness.notifier.sent().len(), 1);
}

#[test]
fn match_without_a_profile_retries_then_fails_terminally() {
    let now = monday_at(10);
    let now_utc = now.with_timezone(&Utc);
    let harness = harness();
    let owner = user("alice");

    harness
        .queue
        .enqueue(
            QueueItemRequest::new(QueueItemKind::Match, owner.clone()),
            now_utc,
        )
        .expect("enqueue");

    let w = worker(&harness);
    for _ in 0..2 {
        let report = w.process_batch(now).expect("batch");
        assert_eq!(report.retried, 1);
        assert_eq!(report.failed, 0);
    }
    let report = w.process_batch(now).expect("batch");
    assert_eq!(report.failed, 1);

    let items = harness.queue.items_for_owner(&owner).expect("items");
    assert_eq!(items[0].status, QueueStatus::Failed);
    assert_eq!(
        items[0].last_error.as_deref(),
        Some("candidate profile not found")
    );

    let sent = harness.notifier.sent();
    assert!(matches!(
        sent.last(),
        Some(Notification::AutomationFailed {
            kind: QueueItemKind::Match,
            ..
        })
    ));
}

#[test]
fn apply_items_submit_record_and_notify() {
    let now = monday_at(10);
    let now_utc = now.with_timezone(&Utc);
    let harness = harness();
    let owner = user("alice");
    let url = "https://jobs.example.com/backend-1";

    harness
        .stores
        .insert_job(posting("Backend Engineer", url, now_utc));
    harness
        .queue
        .enqueue(apply_request("alice", url), now_utc)
        .expect("enqueue");

    let report = worker(&harness).process_batch(now).expect("batch");
    assert_eq!(report.completed, 1);

    let applications = harness.stores.applications_for(&owner);
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0].job_url, url);
    assert_eq!(applications[0].status, ApplicationStatus::Applied);

    assert!(matches!(
        harness.notifier.sent().as_slice(),
        [Notification::ApplicationSubmitted { .. }]
    ));
}

#[test]
fn apply_items_for_already_submitted_jobs_complete_without_resubmitting() {
    let now = monday_at(10);
    let now_utc = now.with_timezone(&Utc);
    let url = "https://jobs.example.com/backend-1";

    // A submitter that would reject proves the handler never reaches it.
    let harness = harness_with(
        StubScraper {
            postings: Vec::new(),
            fail: false,
        },
        StubSubmitter { reject: true },
    );
    let owner = user("alice");
    harness
        .stores
        .insert_job(posting("Backend Engineer", url, now_utc));
    harness.stores.insert_application(ApplicationRecord {
        user: owner.clone(),
        job_url: url.to_string(),
        status: ApplicationStatus::Applied,
        applied_at: now_utc - Duration::hours(1),
    });

    harness
        .queue
        .enqueue(apply_request("alice", url), now_utc)
        .expect("enqueue");

    let report = worker(&harness).process_batch(now).expect("batch");
    assert_eq!(report.completed, 1);
    assert_eq!(harness.stores.applications_for(&owner).len(), 1);
    assert!(harness.notifier.sent().is_empty());
}

#[test]
fn apply_items_respect_the_daily_cap_at_processing_time() {
    let now = monday_at(10);
    let now_utc = now.with_timezone(&Utc);
    let harness = harness();
    let owner = user("alice");

    let mut settings = enabled_settings();
    settings.max_applications_per_day = 1;
    harness.stores.insert_settings(&owner, settings);
    harness.stores.insert_application(ApplicationRecord {
        user: owner.clone(),
        job_url: "https://jobs.example.com/earlier".to_string(),
        status: ApplicationStatus::Applied,
        applied_at: now_utc - Duration::hours(1),
    });
    harness.stores.insert_job(posting(
        "Backend Engineer",
        "https://jobs.example.com/backend-1",
        now_utc,
    ));

    harness
        .queue
        .enqueue(
            apply_request("alice", "https://jobs.example.com/backend-1"),
            now_utc,
        )
        .expect("enqueue");

    let report = worker(&harness).process_batch(now).expect("batch");
    assert_eq!(report.completed, 1);
    // Only the pre-existing application remains.
    assert_eq!(harness.stores.applications_for(&owner).len(), 1);
    assert!(harness.notifier.sent().is_empty());
}

#[test]
fn apply_items_for_missing_jobs_fail_with_the_job_url() {
    let now = monday_at(10);
    let now_utc = now.with_timezone(&Utc);
    let harness = harness();

    harness
        .queue
        .enqueue(
            apply_request("alice", "https://jobs.example.com/gone"),
            now_utc,
        )
        .expect("enqueue");

    let report = worker(&harness).process_batch(now).expect("batch");
    assert_eq!(report.retried, 1);

    let items = harness.queue.items_for_owner(&user("alice")).expect("items");
    assert_eq!(
        items[0].last_error.as_deref(),
        Some("job posting not found: https://jobs.example.com/gone")
    );
}

#[test]
fn notify_items_publish_the_daily_summary() {
    let now = monday_at(18);
    let now_utc = now.with_timezone(&Utc);
    let harness = harness();
    let owner = user("alice");

    harness.stores.insert_application(ApplicationRecord {
        user: owner.clone(),
        job_url: "https://jobs.example.com/today".to_string(),
        status: ApplicationStatus::Applied,
        applied_at: now_utc - Duration::hours(2),
    });
    harness.stores.insert_application(ApplicationRecord {
        user: owner.clone(),
        job_url: "https://jobs.example.com/last-week".to_string(),
        status: ApplicationStatus::Applied,
        applied_at: now_utc - Duration::days(7),
    });

    harness
        .queue
        .enqueue(
            QueueItemRequest::new(QueueItemKind::Notify, owner.clone()),
            now_utc,
        )
        .expect("enqueue");

    worker(&harness).process_batch(now).expect("batch");

    assert_eq!(
        harness.notifier.sent(),
        vec![Notification::DailySummary {
            user: owner,
            applications_today: 1,
            matches_today: 0,
            total_applications: 2,
        }]
    );
}

#[test]
fn cleanup_items_prune_old_jobs_and_settled_queue_entries() {
    let now = monday_at(3);
    let now_utc = now.with_timezone(&Utc);
    let harness = harness();

    harness.stores.insert_job(posting(
        "Backend Engineer",
        "https://jobs.example.com/stale",
        now_utc - Duration::days(120),
    ));
    harness.stores.insert_job(posting(
        "Backend Engineer",
        "https://jobs.example.com/fresh",
        now_utc - Duration::days(5),
    ));

    // A long-settled queue item, completed 40 days ago.
    let long_ago = now_utc - Duration::days(40);
    let old_item = harness
        .queue
        .enqueue(
            QueueItemRequest::new(QueueItemKind::Match, user("alice")),
            long_ago,
        )
        .expect("enqueue");
    harness
        .queue
        .claim_pending(1, long_ago, Duration::minutes(15))
        .expect("claim");
    harness
        .queue
        .mark_completed(&old_item.id, long_ago)
        .expect("complete");

    harness
        .queue
        .enqueue(
            crate::workflows::automation::policy::cleanup_request(),
            now_utc,
        )
        .expect("enqueue");

    let report = worker(&harness).process_batch(now).expect("batch");
    assert_eq!(report.completed, 1);
    assert_eq!(harness.stores.job_count(), 1);
    assert!(harness
        .queue
        .items_for_owner(&user("alice"))
        .expect("items")
        .is_empty());
}

#[test]
fn batches_are_bounded_and_fifo() {
    let now = monday_at(10);
    let now_utc = now.with_timezone(&Utc);
    let harness = harness();

    let first = harness
        .queue
        .enqueue(
            QueueItemRequest::new(QueueItemKind::Notify, user("alice")),
            now_utc - Duration::minutes(2),
        )
        .expect("enqueue");
    harness
        .queue
        .enqueue(
            QueueItemRequest::new(QueueItemKind::Notify, user("alice")),
            now_utc - Duration::minutes(1),
        )
        .expect("enqueue");

    let config = QueueConfig {
        batch_size: 1,
        ..QueueConfig::default()
    };
    let report = QueueWorker::new(config, harness.context.clone())
        .process_batch(now)
        .expect("batch");
    assert_eq!(report.claimed, 1);

    let items = harness.queue.items_for_owner(&user("alice")).expect("items");
    assert_eq!(items[0].id, first.id);
    assert_eq!(items[0].status, QueueStatus::Completed);
    assert_eq!(items[1].status, QueueStatus::Pending);
}
