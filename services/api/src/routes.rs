use crate::infra::AppState;
use autoapply::error::AppError;
use autoapply::workflows::automation::{
    evaluate_tick, BatchReport, InMemoryQueueStore, QueueItem, QueueStore, QueueWorker,
    UserTickContext,
};
use autoapply::workflows::matching::{match_router, UserId};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Shared handles for the automation endpoints: the queue they enqueue into
/// and the worker that settles it.
#[derive(Clone)]
pub(crate) struct AutomationState {
    pub(crate) queue: Arc<InMemoryQueueStore>,
    pub(crate) worker: Arc<QueueWorker>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TickRequest {
    pub(crate) users: Vec<UserTickContext>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TickResponse {
    pub(crate) enqueued: usize,
    pub(crate) report: BatchReport,
}

pub(crate) fn with_automation_routes() -> axum::Router {
    match_router()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/automation/tick",
            axum::routing::post(tick_endpoint),
        )
        .route("/api/v1/queue/:owner", axum::routing::get(queue_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// One automation tick: evaluate the submitted user contexts, enqueue the
/// resulting work, and run a worker batch over the queue.
pub(crate) async fn tick_endpoint(
    Extension(state): Extension<AutomationState>,
    Json(payload): Json<TickRequest>,
) -> Result<Json<TickResponse>, AppError> {
    let now = Local::now();
    let now_utc = now.with_timezone(&Utc);

    let requests = evaluate_tick(now, &payload.users);
    let enqueued = requests.len();
    for request in requests {
        state.queue.enqueue(request, now_utc)?;
    }

    let report = state.worker.process_batch(now)?;
    Ok(Json(TickResponse { enqueued, report }))
}

pub(crate) async fn queue_endpoint(
    Extension(state): Extension<AutomationState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<QueueItem>>, AppError> {
    let items = state.queue.items_for_owner(&UserId(owner))?;
    Ok(Json(items))
}
