use crate::cli::ServeArgs;
use crate::infra::{self, AppState, RecruitIntake};
use crate::routes::recruit_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use recruit_ai::config::AppConfig;
use recruit_ai::error::AppError;
use recruit_ai::telemetry;
use recruit_ai::workflows::recruit::{AdmissionController, RunDispatcher};
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

    let pipeline = infra::build_pipeline(&config.recruit).await?;
    let admission = Arc::new(AdmissionController::new(
        config.recruit.dispatch.admission_cooldown,
    ));
    let dispatcher = RunDispatcher::spawn(
        pipeline,
        config.recruit.dispatch.workers,
        config.recruit.dispatch.queue_depth,
    );
    let intake = Arc::new(RecruitIntake::new(
        admission,
        dispatcher,
        config.recruit.resume_folder_id.clone(),
    ));

    let app = recruit_router(intake)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recruiting workflow orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
