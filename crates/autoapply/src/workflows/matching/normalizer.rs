//! Adapts heterogeneous stored rows into the canonical scoring inputs.
//!
//! The stored shapes are deliberately loose: a profile row with every field
//! optional, separate skill rows, dated experience spans, and job rows that
//! carry salary either as free text or as numeric bounds. Normalization
//! always succeeds; absent data becomes empty collections or zero and the
//! scorer's neutral defaults take it from there.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CandidateCriteria, JobPosting, SalaryExpectation};

/// Profile row as stored; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub full_name: Option<String>,
    pub years_of_experience: Option<f32>,
    pub desired_job_titles: Option<Vec<String>>,
    pub preferred_locations: Option<Vec<String>>,
    pub desired_salary_min: Option<u32>,
    pub desired_salary_max: Option<u32>,
}

/// One skill row attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub skill_name: String,
    pub proficiency_level: Option<String>,
    pub years_of_experience: Option<f32>,
}

/// One dated employment span; an open end date means "current".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Job row as stored by a scraper or manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub salary_range: Option<String>,
    pub url: String,
    pub posted_at: Option<DateTime<Utc>>,
}

/// Build one `CandidateCriteria` from a profile, its skill rows, and its
/// experience spans. An explicitly stored years-of-experience value wins
/// over the figure derived from spans.
pub fn normalize_candidate(
    profile: &ProfileRecord,
    skills: &[SkillRecord],
    experiences: &[ExperienceRecord],
    today: NaiveDate,
) -> CandidateCriteria {
    let experience_years = profile
        .years_of_experience
        .unwrap_or_else(|| total_experience_years(experiences, today));

    CandidateCriteria {
        skills: skills.iter().map(|s| s.skill_name.clone()).collect(),
        experience_years,
        preferred_titles: profile.desired_job_titles.clone().unwrap_or_default(),
        preferred_locations: profile.preferred_locations.clone().unwrap_or_default(),
        salary_expectation: SalaryExpectation {
            min: profile.desired_salary_min,
            max: profile.desired_salary_max,
        },
    }
}

/// Produce the single canonical posting shape the scorer consumes. Free-text
/// salary wins; numeric bounds are rendered into range text when only they
/// are present.
pub fn normalize_job(record: &JobRecord, now: DateTime<Utc>) -> JobPosting {
    let salary_range = record.salary_range.clone().or_else(|| {
        record.salary_max.map(|max| {
            format!("${}-${}", record.salary_min.unwrap_or(0), max)
        })
    });

    JobPosting {
        title: record.title.clone(),
        company: record.company.clone(),
        location: record.location.clone(),
        description: record.description.clone(),
        requirements: record.requirements.clone(),
        salary_range,
        posted_at: record.posted_at.unwrap_or(now),
        url: record.url.clone(),
    }
}

/// Total years across employment spans, rounded to one decimal. Open spans
/// run through `today`; inverted spans contribute nothing.
pub fn total_experience_years(experiences: &[ExperienceRecord], today: NaiveDate) -> f32 {
    let mut total_months: i32 = 0;

    for span in experiences {
        let end = span.end_date.unwrap_or(today);
        let months = (end.year() - span.start_date.year()) * 12
            + (end.month() as i32 - span.start_date.month() as i32);
        total_months += months.max(0);
    }

    (total_months as f32 / 12.0 * 10.0).round() / 10.0
}
