use std::sync::OnceLock;

use regex::Regex;

use super::super::domain::{CandidateCriteria, JobPosting, SalaryExpectation};
use super::vocabulary::COMMON_SKILLS;

/// Requirements and description concatenated and lowercased; the haystack
/// every text heuristic below scans.
pub(crate) fn job_text(job: &JobPosting) -> String {
    let requirements = job.requirements.as_deref().unwrap_or("");
    let description = job.description.as_deref().unwrap_or("");
    format!("{requirements} {description}").to_lowercase()
}

pub(crate) struct SkillsScore {
    pub score: u8,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

pub(crate) fn skills_component(job: &JobPosting, criteria: &CandidateCriteria) -> SkillsScore {
    let has_requirements = job.requirements.as_deref().is_some_and(|s| !s.is_empty());
    let has_description = job.description.as_deref().is_some_and(|s| !s.is_empty());
    if !has_requirements && !has_description {
        // No evidence either way.
        return SkillsScore {
            score: 50,
            matched: Vec::new(),
            missing: Vec::new(),
        };
    }

    let text = job_text(job);

    let normalized: Vec<String> = criteria
        .skills
        .iter()
        .map(|skill| skill.to_lowercase().trim().to_string())
        .collect();

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for skill in &normalized {
        if !skill.is_empty() && text.contains(skill.as_str()) {
            matched.push(skill.clone());
        } else {
            missing.push(skill.clone());
        }
    }

    // The vocabulary scan is whole-word so that e.g. "sql" does not fire
    // inside "postgresql"; candidate skills above stay plain substrings so
    // "react" still matches "reactjs".
    let required: Vec<&str> = COMMON_SKILLS
        .iter()
        .copied()
        .filter(|skill| contains_word(&text, skill))
        .collect();
    let intersection = required
        .iter()
        .filter(|skill| normalized.iter().any(|s| s == *skill))
        .count();

    let score = if !required.is_empty() {
        intersection as f64 / required.len() as f64 * 100.0
    } else if !matched.is_empty() {
        (matched.len() as f64 / normalized.len() as f64 * 100.0).min(100.0)
    } else {
        40.0
    };

    SkillsScore {
        score: score.round() as u8,
        matched,
        missing,
    }
}

/// Whole-word containment: every occurrence of `word` must not touch an
/// alphanumeric neighbor on either side.
fn contains_word(text: &str, word: &str) -> bool {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(word) {
        let start = search_from + offset;
        let end = start + word.len();

        let left_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let right_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }

        search_from = end;
    }
    false
}

fn title_tokens(title: &str) -> Vec<&str> {
    title
        .split(|c: char| c.is_whitespace() || c == '-' || c == '/')
        .filter(|token| !token.is_empty())
        .collect()
}

pub(crate) fn title_component(job_title: &str, preferred_titles: &[String]) -> u8 {
    if preferred_titles.is_empty() {
        return 50;
    }

    let job_title = job_title.to_lowercase().trim().to_string();
    let job_keywords: Vec<&str> = title_tokens(&job_title)
        .into_iter()
        .filter(|token| token.len() > 2)
        .collect();

    let mut max_score: f64 = 0.0;

    for preferred in preferred_titles {
        let preferred = preferred.to_lowercase().trim().to_string();
        if preferred.is_empty() {
            continue;
        }

        if job_title == preferred {
            max_score = max_score.max(100.0);
            continue;
        }

        if job_title.contains(&preferred) || preferred.contains(&job_title) {
            max_score = max_score.max(90.0);
            continue;
        }

        let preferred_keywords = title_tokens(&preferred);
        if preferred_keywords.is_empty() {
            continue;
        }
        let matched = preferred_keywords
            .iter()
            .filter(|keyword| {
                job_keywords
                    .iter()
                    .any(|job_keyword| job_keyword.contains(*keyword) || keyword.contains(job_keyword))
            })
            .count();

        let keyword_score = matched as f64 / preferred_keywords.len() as f64 * 80.0;
        max_score = max_score.max(keyword_score);
    }

    max_score.round() as u8
}

pub(crate) fn location_component(
    job_location: Option<&str>,
    preferred_locations: &[String],
) -> u8 {
    let Some(job_location) = job_location.filter(|l| !l.trim().is_empty()) else {
        return 70;
    };
    if preferred_locations.is_empty() {
        return 70;
    }

    let job_location = job_location.to_lowercase().trim().to_string();

    if job_location.contains("remote") || job_location.contains("anywhere") {
        return 100;
    }

    for preferred in preferred_locations {
        let preferred = preferred.to_lowercase().trim().to_string();
        if preferred.is_empty() {
            continue;
        }

        if job_location == preferred {
            return 100;
        }

        if job_location.contains(&preferred) || preferred.contains(&job_location) {
            return 90;
        }

        // Same country/region check over comma-separated parts.
        let job_parts: Vec<&str> = job_location.split(',').map(str::trim).collect();
        let shared = job_parts
            .iter()
            .any(|part| preferred.split(',').map(str::trim).any(|p| p == *part));
        if shared {
            return 70;
        }
    }

    30
}

fn years_with_experience_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\+?\s*years?\s*(of\s*)?experience").expect("valid regex"))
}

fn years_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*to\s*(\d+)\s*years").expect("valid regex"))
}

fn minimum_years_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"minimum\s*(\d+)\s*years").expect("valid regex"))
}

/// First explicit year figure found in priority order, then seniority
/// keyword inference; `None` when the posting gives no signal at all.
pub(crate) fn required_years(text: &str) -> Option<f32> {
    for pattern in [
        years_with_experience_re(),
        years_range_re(),
        minimum_years_re(),
    ] {
        if let Some(captures) = pattern.captures(text) {
            if let Ok(years) = captures[1].parse::<u32>() {
                return Some(years as f32);
            }
        }
    }

    if text.contains("entry level") || text.contains("junior") || text.contains("graduate") {
        Some(1.0)
    } else if text.contains("senior") || text.contains("lead") {
        Some(5.0)
    } else if text.contains("mid-level") || text.contains("intermediate") {
        Some(3.0)
    } else {
        None
    }
}

pub(crate) fn experience_component(job: &JobPosting, candidate_years: f32) -> u8 {
    let text = job_text(job);

    let Some(required) = required_years(&text) else {
        return 70;
    };

    let difference = (candidate_years - required).abs();

    if difference == 0.0 {
        100
    } else if difference <= 1.0 {
        90
    } else if difference <= 2.0 {
        75
    } else if difference <= 3.0 {
        60
    } else if difference <= 5.0 {
        40
    } else {
        20
    }
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

pub(crate) fn salary_component(
    salary_range: Option<&str>,
    expectation: &SalaryExpectation,
) -> u8 {
    let Some(salary_range) = salary_range.filter(|s| !s.trim().is_empty()) else {
        return 70;
    };
    if expectation.is_unset() {
        return 70;
    }

    let mut numbers = number_re()
        .find_iter(salary_range)
        .filter_map(|m| m.as_str().parse::<u64>().ok());
    let Some(first) = numbers.next() else {
        return 70;
    };
    let second = numbers.next().unwrap_or(first);

    let mut job_min = first as f64;
    let mut job_max = second as f64;
    if salary_range.to_lowercase().contains('k') {
        job_min *= 1000.0;
        job_max *= 1000.0;
    }

    let user_min = expectation.min.map(f64::from).unwrap_or(0.0);
    let user_max = expectation.max.map(f64::from).unwrap_or(f64::INFINITY);

    if job_max < user_min || job_min > user_max {
        return 20;
    }

    // Full containment either way counts as full overlap.
    if (job_min >= user_min && job_max <= user_max) || (user_min >= job_min && user_max <= job_max)
    {
        return 100;
    }

    let overlap = job_max.min(user_max) - job_min.max(user_min);
    let avg_range = ((user_max - user_min) + (job_max - job_min)) / 2.0;
    if !avg_range.is_finite() || avg_range <= 0.0 {
        return 100;
    }

    let percentage = (overlap / avg_range * 100.0).min(100.0);
    percentage.round() as u8
}
