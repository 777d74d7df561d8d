use crate::cli::ServeArgs;
use crate::infra::{load_config, AppState};
use crate::routes::with_grading_routes;
use assignment_grader::error::AppError;
use assignment_grader::grading::{Grader, GradingState};
use assignment_grader::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let config = load_config(args.host, args.port)?;

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let grader = Arc::new(Grader::from_config(&config.grading));
    let grading_state = GradingState::new(grader, &config.grading);

    let app = with_grading_routes(grading_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    readiness_flag.store(true, Ordering::Release);
    info!(?config.environment, %addr, "assignment grader ready");

    axum::serve(listener, app).await?;
    Ok(())
}
