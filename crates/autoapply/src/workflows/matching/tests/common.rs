use chrono::{TimeZone, Utc};

use crate::workflows::matching::domain::{CandidateCriteria, JobPosting, SalaryExpectation};

pub(super) fn posting(title: &str, url: &str) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        company: "Acme Corp".to_string(),
        location: Some("Des Moines, IA".to_string()),
        description: None,
        requirements: None,
        salary_range: None,
        posted_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid"),
        url: url.to_string(),
    }
}

/// The backend-engineer posting used by the end-to-end scoring scenario.
pub(super) fn backend_posting() -> JobPosting {
    JobPosting {
        title: "Backend Engineer".to_string(),
        company: "Initech".to_string(),
        location: Some("Remote".to_string()),
        description: None,
        requirements: Some("5+ years experience with Python, AWS, PostgreSQL".to_string()),
        salary_range: Some("$120k-$150k".to_string()),
        posted_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid"),
        url: "https://jobs.example.com/backend-1".to_string(),
    }
}

pub(super) fn backend_criteria() -> CandidateCriteria {
    CandidateCriteria {
        skills: vec!["python".to_string(), "aws".to_string()],
        experience_years: 5.0,
        preferred_titles: vec!["backend engineer".to_string()],
        preferred_locations: vec!["San Francisco".to_string()],
        salary_expectation: SalaryExpectation {
            min: Some(100_000),
            max: Some(160_000),
        },
    }
}

pub(super) fn empty_posting() -> JobPosting {
    JobPosting {
        title: String::new(),
        company: String::new(),
        location: None,
        description: None,
        requirements: None,
        salary_range: None,
        posted_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid"),
        url: "https://jobs.example.com/empty".to_string(),
    }
}
