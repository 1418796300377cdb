use chrono::{DateTime, Datelike, Duration, Local, Timelike, Utc, Weekday};
use serde_json::json;
use tracing::{debug, warn};

use super::domain::UserTickContext;
use super::queue::{QueueItemKind, QueueItemRequest};
use crate::workflows::matching::UserId;

const SCRAPE_TITLE_LIMIT: usize = 3;
const DEFAULT_SCRAPE_LOCATION: &str = "United States";

/// Per-tick automation decisions for a set of users.
///
/// Runs on an externally driven tick (cron, scheduler, test harness) and
/// performs no I/O: everything it consults arrives in the contexts, and its
/// output is the list of queue items to create. Decisions are evaluated
/// scrape, then match, then apply for each user; users are independent of
/// one another.
///
/// Re-running the evaluator for the same tick never double-counts the daily
/// cap (it is derived fresh from application history), but it can
/// double-enqueue apply items if run twice before the first batch completes.
/// The apply handler re-checks "already applied" before submission as the
/// second guard.
pub fn evaluate_tick(now: DateTime<Local>, users: &[UserTickContext]) -> Vec<QueueItemRequest> {
    let mut requests = Vec::new();
    let now_utc = now.with_timezone(&Utc);

    for context in users {
        if let Err(error) = context.settings.validate() {
            warn!(user = %context.user.0, %error, "skipping user with invalid automation settings");
            continue;
        }

        scrape_decision(now_utc, context, &mut requests);
        match_decision(now_utc, context, &mut requests);
        apply_decision(now, context, &mut requests);
    }

    requests
}

fn frequency_elapsed(
    now_utc: DateTime<Utc>,
    last: Option<DateTime<Utc>>,
    hours: u32,
) -> bool {
    match last {
        Some(last) => now_utc - last >= Duration::hours(i64::from(hours)),
        None => true,
    }
}

fn scrape_decision(
    now_utc: DateTime<Utc>,
    context: &UserTickContext,
    requests: &mut Vec<QueueItemRequest>,
) {
    let settings = &context.settings;
    if !settings.auto_scrape_enabled || context.desired_job_titles.is_empty() {
        return;
    }

    if !frequency_elapsed(
        now_utc,
        context.last_scrape_enqueued_at,
        settings.scrape_frequency_hours,
    ) {
        debug!(user = %context.user.0, "scrape skipped: within frequency window");
        return;
    }

    let location = context
        .preferred_locations
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_SCRAPE_LOCATION.to_string());

    for portal in &settings.preferred_portals {
        for title in context.desired_job_titles.iter().take(SCRAPE_TITLE_LIMIT) {
            requests.push(QueueItemRequest::with_payload(
                QueueItemKind::Scrape,
                context.user.clone(),
                json!({
                    "portal": portal.to_lowercase(),
                    "query": title,
                    "location": location,
                }),
            ));
        }
    }
}

fn match_decision(
    now_utc: DateTime<Utc>,
    context: &UserTickContext,
    requests: &mut Vec<QueueItemRequest>,
) {
    let settings = &context.settings;
    if !settings.auto_match_enabled {
        return;
    }

    if let Some(hours) = settings.match_frequency_hours {
        if !frequency_elapsed(now_utc, context.last_match_enqueued_at, hours) {
            debug!(user = %context.user.0, "match skipped: within frequency window");
            return;
        }
    }

    requests.push(QueueItemRequest::new(
        QueueItemKind::Match,
        context.user.clone(),
    ));
}

fn apply_decision(
    now: DateTime<Local>,
    context: &UserTickContext,
    requests: &mut Vec<QueueItemRequest>,
) {
    let settings = &context.settings;
    if !settings.auto_apply_enabled {
        return;
    }

    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        debug!(user = %context.user.0, "apply skipped: weekend");
        return;
    }
    if !settings.apply_window.contains(now.hour()) {
        debug!(user = %context.user.0, hour = now.hour(), "apply skipped: outside window");
        return;
    }

    if context.applications_today >= settings.max_applications_per_day {
        debug!(user = %context.user.0, "apply skipped: daily cap reached");
        return;
    }
    let remaining = (settings.max_applications_per_day - context.applications_today) as usize;

    let mut candidates: Vec<_> = context
        .pending_matches
        .iter()
        .filter(|m| m.total_score >= settings.min_match_score)
        .filter(|m| !context.applied_job_urls.contains(&m.job_url))
        .filter(|m| !settings.excluded_companies.contains(&m.company))
        .collect();
    candidates.sort_by(|a, b| b.total_score.cmp(&a.total_score));

    for candidate in candidates.into_iter().take(remaining) {
        requests.push(QueueItemRequest::with_payload(
            QueueItemKind::Apply,
            context.user.clone(),
            json!({ "job_url": candidate.job_url }),
        ));
    }
}

/// One daily-summary notification item per user.
pub fn daily_summary_requests(users: &[UserId]) -> Vec<QueueItemRequest> {
    users
        .iter()
        .map(|user| QueueItemRequest::new(QueueItemKind::Notify, user.clone()))
        .collect()
}

/// Global maintenance item owned by the system sentinel.
pub fn cleanup_request() -> QueueItemRequest {
    QueueItemRequest::new(QueueItemKind::Cleanup, UserId::system())
}
