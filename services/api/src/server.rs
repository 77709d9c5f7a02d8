use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lhi::access::AccessCodeService;
use lhi::admin::AdminAuthenticator;
use lhi::assessment::{narrator_from_config, AssessmentService, ScoringEngine};
use lhi::config::AppConfig;
use lhi::error::AppError;
use lhi::persistence::memory::{InMemoryAccessCodeRepository, InMemoryAssessmentRepository};
use lhi::telemetry;
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

    let auth = Arc::new(AdminAuthenticator::from_config(&config.admin));

    let access_service = Arc::new(AccessCodeService::new(
        Arc::new(InMemoryAccessCodeRepository::default()),
        config.access.master_codes.clone(),
    ));

    let narrator = narrator_from_config(&config.narrative);
    info!(narrator = narrator.name(), "narrative generator selected");
    let assessment_service = Arc::new(AssessmentService::new(
        Arc::new(ScoringEngine::default()),
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::clone(&access_service),
        narrator,
    ));

    let app = with_service_routes(auth, access_service, assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "relationship health index service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
