use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for a user. The sentinel `"system"` owner is used for
/// global maintenance work that belongs to no account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub const SYSTEM: &'static str = "system";

    pub fn system() -> Self {
        Self(Self::SYSTEM.to_string())
    }

    pub fn is_system(&self) -> bool {
        self.0 == Self::SYSTEM
    }
}

/// Canonical representation of a scraped or manually entered job listing.
/// The URL is the dedup key: two postings with the same URL are the same job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary_range: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub url: String,
}

/// Salary expectation bounds; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryExpectation {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl SalaryExpectation {
    pub fn is_unset(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Normalized scoring input derived from a candidate's profile and skill
/// records. Immutable per scoring call; missing profile data shows up here
/// as empty collections or zero, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCriteria {
    pub skills: Vec<String>,
    pub experience_years: f32,
    pub preferred_titles: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub salary_expectation: SalaryExpectation,
}

impl Default for CandidateCriteria {
    fn default() -> Self {
        Self {
            skills: Vec::new(),
            experience_years: 0.0,
            preferred_titles: Vec::new(),
            preferred_locations: Vec::new(),
            salary_expectation: SalaryExpectation::default(),
        }
    }
}

/// The five weighted sub-scores plus total for one (job, candidate) pair.
/// Every field is an integer in `0..=100`; evaluations are independent and
/// may be recomputed at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScoreBreakdown {
    pub skills_match: u8,
    pub title_match: u8,
    pub location_match: u8,
    pub experience_match: u8,
    pub salary_match: u8,
    pub total_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// A job posting paired with its computed breakdown, as produced by the
/// batch ranking helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedJob {
    pub job: JobPosting,
    pub breakdown: MatchScoreBreakdown,
}
