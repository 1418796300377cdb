//! Job-candidate match scoring: canonical domain shapes, row normalization,
//! the weighted scorer, and a small HTTP surface over it.

pub mod domain;
pub mod normalizer;
pub mod router;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use domain::{
    CandidateCriteria, JobPosting, MatchScoreBreakdown, RankedJob, SalaryExpectation, UserId,
};
pub use normalizer::{
    normalize_candidate, normalize_job, total_experience_years, ExperienceRecord, JobRecord,
    ProfileRecord, SkillRecord,
};
pub use router::match_router;
pub use scoring::{rank_jobs, score_match};
