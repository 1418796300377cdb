use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::matching::UserId;

/// Daily local-time range during which automatic submission is permitted.
/// Same-day only: the window never wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl ApplyWindow {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Per-user configuration governing scrape/match/apply automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationSettings {
    pub auto_apply_enabled: bool,
    pub min_match_score: u8,
    pub max_applications_per_day: u32,
    pub apply_window: ApplyWindow,
    pub excluded_companies: BTreeSet<String>,
    pub auto_scrape_enabled: bool,
    pub scrape_frequency_hours: u32,
    pub auto_match_enabled: bool,
    /// `None` enqueues a match refresh every tick; `Some(h)` rate-limits it
    /// the same way the scrape decision is rate-limited.
    pub match_frequency_hours: Option<u32>,
    pub preferred_portals: Vec<String>,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            auto_apply_enabled: false,
            min_match_score: 70,
            max_applications_per_day: 5,
            apply_window: ApplyWindow {
                start_hour: 9,
                end_hour: 17,
            },
            excluded_companies: BTreeSet::new(),
            auto_scrape_enabled: false,
            scrape_frequency_hours: 24,
            auto_match_enabled: true,
            match_frequency_hours: None,
            preferred_portals: vec!["linkedin".to_string(), "indeed".to_string()],
        }
    }
}

impl AutomationSettings {
    /// Settings are validated at write time by the settings layer; the
    /// evaluator still calls this defensively and skips users that fail.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.apply_window.start_hour > 23 || self.apply_window.end_hour > 23 {
            return Err(SettingsError::HourOutOfRange);
        }
        if self.apply_window.start_hour >= self.apply_window.end_hour {
            return Err(SettingsError::InvertedWindow {
                start_hour: self.apply_window.start_hour,
                end_hour: self.apply_window.end_hour,
            });
        }
        if self.min_match_score > 100 {
            return Err(SettingsError::ScoreOutOfRange(self.min_match_score));
        }
        if self.max_applications_per_day == 0 {
            return Err(SettingsError::ZeroDailyCap);
        }
        if self.scrape_frequency_hours == 0 {
            return Err(SettingsError::ZeroFrequency);
        }
        if self.match_frequency_hours == Some(0) {
            return Err(SettingsError::ZeroFrequency);
        }
        Ok(())
    }
}

/// Validation errors for automation settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("apply window hours must be within 0..=23")]
    HourOutOfRange,
    #[error("apply window start hour {start_hour} must be before end hour {end_hour}")]
    InvertedWindow { start_hour: u32, end_hour: u32 },
    #[error("minimum match score {0} exceeds 100")]
    ScoreOutOfRange(u8),
    #[error("max applications per day must be positive")]
    ZeroDailyCap,
    #[error("automation frequency hours must be positive")]
    ZeroFrequency,
}

/// Status of a submitted application as tracked over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Applied,
    Accepted,
    Rejected,
    Failed,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Failed => "failed",
        }
    }
}

/// One submitted application; counts toward the owner's daily cap by the
/// local date of `applied_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub user: UserId,
    pub job_url: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// A scored match awaiting an apply decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMatch {
    pub job_url: String,
    pub company: String,
    pub total_score: u8,
}

/// Everything the policy evaluator needs to know about one user at tick
/// time. Derived fresh from the stores by the caller; the evaluator itself
/// performs no I/O.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTickContext {
    pub user: UserId,
    pub settings: AutomationSettings,
    pub applications_today: u32,
    pub applied_job_urls: BTreeSet<String>,
    pub last_scrape_enqueued_at: Option<DateTime<Utc>>,
    pub last_match_enqueued_at: Option<DateTime<Utc>>,
    pub pending_matches: Vec<PendingMatch>,
    pub desired_job_titles: Vec<String>,
    pub preferred_locations: Vec<String>,
}
