//! Observability infrastructure for the pod info service
//!
//! Provides:
//! - Prometheus metrics (request count, request latency, CPU and memory gauges)
//! - Structured JSON logging with tracing

use crate::error::{ServiceError, ServiceResult};
use crate::models::HostSample;
use prometheus::{
    histogram_opts, opts, Encoder, Gauge, GaugeVec, Histogram, HistogramTimer, HistogramVec,
    IntCounter, IntCounterVec, Registry, TextEncoder, TEXT_FORMAT,
};
use tracing::{info, warn};

/// Label carried by every service metric
const POD_LABEL: &str = "pod";

/// Service metrics for Prometheus exposition
///
/// Owns its own registry so that each instance starts from zero. The `pod`
/// label is bound once at construction and never changes. Clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    request_count: IntCounter,
    request_latency_seconds: Histogram,
    cpu_utilization_percent: Gauge,
    memory_usage_mb: Gauge,
}

impl ServiceMetrics {
    /// Register all service metrics for the given pod name
    pub fn new(pod_name: &str) -> ServiceResult<Self> {
        let registry = Registry::new();

        let request_count = IntCounterVec::new(
            opts!(
                "request_count_total",
                "Total number of requests handled by each pod"
            ),
            &[POD_LABEL],
        )?;
        let request_latency = HistogramVec::new(
            histogram_opts!("request_latency_seconds", "Request latency in seconds"),
            &[POD_LABEL],
        )?;
        let cpu_utilization = GaugeVec::new(
            opts!(
                "cpu_utilization_percent",
                "Current CPU utilization percentage"
            ),
            &[POD_LABEL],
        )?;
        let memory_usage = GaugeVec::new(
            opts!("memory_usage_mb", "Current memory usage in MB"),
            &[POD_LABEL],
        )?;

        registry.register(Box::new(request_count.clone()))?;
        registry.register(Box::new(request_latency.clone()))?;
        registry.register(Box::new(cpu_utilization.clone()))?;
        registry.register(Box::new(memory_usage.clone()))?;

        Ok(Self {
            request_count: request_count.get_metric_with_label_values(&[pod_name])?,
            request_latency_seconds: request_latency.get_metric_with_label_values(&[pod_name])?,
            cpu_utilization_percent: cpu_utilization.get_metric_with_label_values(&[pod_name])?,
            memory_usage_mb: memory_usage.get_metric_with_label_values(&[pod_name])?,
            registry,
        })
    }

    /// Increment the request counter
    pub fn inc_requests(&self) {
        self.request_count.inc();
    }

    /// Start timing a request; the latency is observed when the timer drops
    pub fn start_request_timer(&self) -> HistogramTimer {
        self.request_latency_seconds.start_timer()
    }

    /// Overwrite the CPU and memory gauges with a fresh sample
    pub fn set_host_usage(&self, sample: &HostSample) {
        self.cpu_utilization_percent.set(sample.cpu_percent);
        self.memory_usage_mb.set(sample.memory_used_mb);
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.get()
    }

    pub fn latency_sample_count(&self) -> u64 {
        self.request_latency_seconds.get_sample_count()
    }

    pub fn cpu_utilization(&self) -> f64 {
        self.cpu_utilization_percent.get()
    }

    pub fn memory_usage(&self) -> f64 {
        self.memory_usage_mb.get()
    }

    /// Content type of [`ServiceMetrics::encode`] output
    pub fn content_type(&self) -> &'static str {
        TEXT_FORMAT
    }

    /// Encode every registered metric in the Prometheus text format
    pub fn encode(&self) -> ServiceResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    pod_name: String,
}

impl StructuredLogger {
    pub fn new(pod_name: impl Into<String>) -> Self {
        Self {
            pod_name: pod_name.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, title: &str, version: &str, addr: &str, metrics_enabled: bool) {
        info!(
            event = "service_started",
            pod = %self.pod_name,
            app_title = %title,
            app_version = %version,
            addr = %addr,
            metrics_enabled = metrics_enabled,
            "Pod info service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            pod = %self.pod_name,
            reason = %reason,
            "Pod info service shutting down"
        );
    }

    /// Log an info request that ended in an internal error
    pub fn log_request_failed(&self, error: &ServiceError) {
        warn!(
            event = "info_request_failed",
            pod = %self.pod_name,
            error_type = %error.error_type(),
            details = %error,
            "Info request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_start_at_zero() {
        let metrics = ServiceMetrics::new("pod-a").unwrap();

        assert_eq!(metrics.request_count(), 0);
        assert_eq!(metrics.latency_sample_count(), 0);
        assert_eq!(metrics.cpu_utilization(), 0.0);
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let first = ServiceMetrics::new("pod-a").unwrap();
        let second = ServiceMetrics::new("pod-a").unwrap();

        first.inc_requests();
        first.inc_requests();

        assert_eq!(first.request_count(), 2);
        assert_eq!(second.request_count(), 0);
    }

    #[test]
    fn test_timer_observes_on_drop() {
        let metrics = ServiceMetrics::new("pod-a").unwrap();
        {
            let _timer = metrics.start_request_timer();
        }
        assert_eq!(metrics.latency_sample_count(), 1);
    }

    #[test]
    fn test_gauges_keep_unrounded_values() {
        let metrics = ServiceMetrics::new("pod-a").unwrap();
        metrics.set_host_usage(&HostSample {
            cpu_percent: 42.5,
            memory_used_mb: 1024.987654,
        });

        assert_eq!(metrics.cpu_utilization(), 42.5);
        assert_eq!(metrics.memory_usage(), 1024.987654);
    }

    #[test]
    fn test_encode_includes_pod_label() {
        let metrics = ServiceMetrics::new("pod-a").unwrap();
        metrics.inc_requests();

        let text = metrics.encode().unwrap();

        assert!(text.contains("request_count_total{pod=\"pod-a\"} 1"));
        assert!(text.contains("# TYPE request_latency_seconds histogram"));
        assert!(text.contains("cpu_utilization_percent{pod=\"pod-a\"}"));
        assert!(text.contains("memory_usage_mb{pod=\"pod-a\"}"));
        assert_eq!(metrics.content_type(), "text/plain; version=0.0.4");
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("pod-a");
        assert_eq!(logger.pod_name, "pod-a");
    }
}
