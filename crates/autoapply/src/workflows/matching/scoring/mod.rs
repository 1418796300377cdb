//! Weighted multi-factor match scoring between one job posting and one
//! candidate's criteria.
//!
//! Component weights are fixed: skills 40%, title 25%, location 15%,
//! experience 10%, salary 10%. Each component is computed on a 0-100 scale
//! and the total is rounded once, from the weighted sum. Missing input data
//! biases toward a neutral-to-generous default rather than zero so that
//! sparse postings or sparse profiles are not systematically excluded.

mod components;
mod vocabulary;

use super::domain::{CandidateCriteria, JobPosting, MatchScoreBreakdown, RankedJob};

pub const SKILLS_WEIGHT: f64 = 0.40;
pub const TITLE_WEIGHT: f64 = 0.25;
pub const LOCATION_WEIGHT: f64 = 0.15;
pub const EXPERIENCE_WEIGHT: f64 = 0.10;
pub const SALARY_WEIGHT: f64 = 0.10;

/// Score one posting against one candidate. Pure and deterministic: no I/O,
/// no clock, identical output for identical input.
pub fn score_match(job: &JobPosting, criteria: &CandidateCriteria) -> MatchScoreBreakdown {
    let skills = components::skills_component(job, criteria);
    let title = components::title_component(&job.title, &criteria.preferred_titles);
    let location =
        components::location_component(job.location.as_deref(), &criteria.preferred_locations);
    let experience = components::experience_component(job, criteria.experience_years);
    let salary =
        components::salary_component(job.salary_range.as_deref(), &criteria.salary_expectation);

    let total = f64::from(skills.score) * SKILLS_WEIGHT
        + f64::from(title) * TITLE_WEIGHT
        + f64::from(location) * LOCATION_WEIGHT
        + f64::from(experience) * EXPERIENCE_WEIGHT
        + f64::from(salary) * SALARY_WEIGHT;

    MatchScoreBreakdown {
        skills_match: skills.score,
        title_match: title,
        location_match: location,
        experience_match: experience,
        salary_match: salary,
        total_score: total.round() as u8,
        matched_skills: skills.matched,
        missing_skills: skills.missing,
    }
}

/// Score a batch of postings, keep those at or above `min_score`, and order
/// them best first. The sort is stable so equal scores keep input order.
pub fn rank_jobs(
    jobs: &[JobPosting],
    criteria: &CandidateCriteria,
    min_score: u8,
) -> Vec<RankedJob> {
    let mut ranked: Vec<RankedJob> = jobs
        .iter()
        .map(|job| RankedJob {
            job: job.clone(),
            breakdown: score_match(job, criteria),
        })
        .filter(|entry| entry.breakdown.total_score >= min_score)
        .collect();

    ranked.sort_by(|a, b| b.breakdown.total_score.cmp(&a.breakdown.total_score));
    ranked
}
