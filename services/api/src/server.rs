use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryDataStore, LoggingNotifier, LoggingSubmitter, StubPortalScraper,
};
use crate::routes::{with_automation_routes, AutomationState};
use autoapply::config::AppConfig;
use autoapply::error::AppError;
use autoapply::telemetry;
use autoapply::workflows::automation::{InMemoryQueueStore, QueueWorker, WorkerContext};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let queue = Arc::new(InMemoryQueueStore::new());
    let data = InMemoryDataStore::default();

    let worker_context = WorkerContext {
        queue: queue.clone(),
        jobs: Arc::new(data.clone()),
        matches: Arc::new(data.clone()),
        applications: Arc::new(data.clone()),
        profiles: Arc::new(data.clone()),
        settings: Arc::new(data.clone()),
        notifier: Arc::new(LoggingNotifier),
        scraper: Arc::new(StubPortalScraper),
        submitter: Arc::new(LoggingSubmitter),
    };
    let worker = Arc::new(QueueWorker::new(config.queue.clone(), worker_context));
    let automation_state = AutomationState { queue, worker };

    let app = with_automation_routes()
        .layer(Extension(app_state))
        .layer(Extension(automation_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "autoapply automation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
