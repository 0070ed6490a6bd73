//! HTTP API for pod info and Prometheus metrics

use crate::{
    error::{ServiceError, ServiceResult},
    models::{InfoResponse, ServiceIdentity},
    observability::{ServiceMetrics, StructuredLogger},
    sampler::{HostSampler, SystemSampler},
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Metrics registry and the host sampler that feeds its gauges
#[derive(Clone)]
pub struct Monitoring {
    pub metrics: ServiceMetrics,
    pub sampler: Arc<dyn HostSampler>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub identity: ServiceIdentity,
    /// `None` runs the identity-only variant without metrics
    pub monitoring: Option<Monitoring>,
    pub logger: StructuredLogger,
}

impl AppState {
    /// State with metrics enabled and the host sampler
    pub fn new(identity: ServiceIdentity) -> ServiceResult<Self> {
        Self::with_sampler(identity, Arc::new(SystemSampler::new()))
    }

    /// State with metrics enabled and a custom sampler
    pub fn with_sampler(
        identity: ServiceIdentity,
        sampler: Arc<dyn HostSampler>,
    ) -> ServiceResult<Self> {
        let metrics = ServiceMetrics::new(&identity.pod_name)?;
        Ok(Self {
            logger: StructuredLogger::new(identity.pod_name.clone()),
            identity,
            monitoring: Some(Monitoring { metrics, sampler }),
        })
    }

    /// Identity-only state: nothing is registered, sampled or updated
    pub fn without_metrics(identity: ServiceIdentity) -> Self {
        Self {
            logger: StructuredLogger::new(identity.pod_name.clone()),
            identity,
            monitoring: None,
        }
    }

    pub fn metrics(&self) -> Option<&ServiceMetrics> {
        self.monitoring.as_ref().map(|m| &m.metrics)
    }

    /// Count the request, sample the host, update gauges and build the body
    fn collect_info(&self, monitoring: &Monitoring) -> ServiceResult<Response> {
        let metrics = &monitoring.metrics;
        metrics.inc_requests();

        let sample = monitoring.sampler.sample()?;
        metrics.set_host_usage(&sample);

        let body = InfoResponse::with_sample(&self.identity, sample);
        debug!(
            cpu_percent = sample.cpu_percent,
            memory_used_mb = sample.memory_used_mb,
            "Served pod info"
        );

        json_response(&body)
    }
}

fn json_response(body: &InfoResponse) -> ServiceResult<Response> {
    let bytes = serde_json::to_vec(body)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        bytes,
    )
        .into_response())
}

/// Pod info endpoint
async fn get_info(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let Some(monitoring) = state.monitoring.as_ref() else {
        return json_response(&InfoResponse::identity(&state.identity));
    };

    // Observes the handler latency on every exit path
    let _timer = monitoring.metrics.start_request_timer();

    state.collect_info(monitoring).map_err(|e| {
        state.logger.log_request_failed(&e);
        e
    })
}

/// Prometheus metrics endpoint, 404 when metrics are disabled
async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let Some(metrics) = state.metrics() else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let body = metrics.encode()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, metrics.content_type())],
        body,
    )
        .into_response())
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get_info", get(get_info))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server on `addr` and run until `shutdown` resolves
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
