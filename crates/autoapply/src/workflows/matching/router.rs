use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::domain::{CandidateCriteria, JobPosting, MatchScoreBreakdown, RankedJob};
use super::scoring::{rank_jobs, score_match};

const DEFAULT_MIN_SCORE: u8 = 60;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub job: JobPosting,
    pub criteria: CandidateCriteria,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub jobs: Vec<JobPosting>,
    pub criteria: CandidateCriteria,
    #[serde(default)]
    pub min_score: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub considered: usize,
    pub ranked: Vec<RankedJob>,
}

/// Router builder exposing the scorer over HTTP. Stateless: both endpoints
/// are pure computations over the request body.
pub fn match_router() -> Router {
    Router::new()
        .route("/api/v1/match/score", post(score_handler))
        .route("/api/v1/match/rank", post(rank_handler))
}

pub(crate) async fn score_handler(
    Json(request): Json<ScoreRequest>,
) -> Json<MatchScoreBreakdown> {
    Json(score_match(&request.job, &request.criteria))
}

pub(crate) async fn rank_handler(Json(request): Json<RankRequest>) -> Json<RankResponse> {
    let min_score = request.min_score.unwrap_or(DEFAULT_MIN_SCORE);
    let ranked = rank_jobs(&request.jobs, &request.criteria, min_score);
    Json(RankResponse {
        considered: request.jobs.len(),
        ranked,
    })
}
