use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ml_job_tracker::{app_state::AppState, config::AppConfig, routes, services::tracker::JobTracker};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing ml-job-tracker server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "training_jobs_submitted_total",
        "Total training jobs accepted"
    );
    metrics::describe_counter!(
        "training_jobs_rejected_total",
        "Total submissions rejected by parameter validation"
    );
    metrics::describe_counter!(
        "training_jobs_completed_total",
        "Total training jobs completed"
    );
    metrics::describe_counter!(
        "training_jobs_failed_total",
        "Total training jobs that failed"
    );
    metrics::describe_gauge!(
        "training_jobs_active",
        "Jobs currently queued or processing"
    );

    let state = AppState::new(JobTracker::new());

    let app = routes::router(state)
        .merge(routes::metrics_router(prometheus_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes));

    tracing::info!("Starting ml-job-tracker on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
