//! Core data models for the pod info service

use serde::{Deserialize, Serialize};

/// Static identity of this replica, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub title: String,
    pub version: String,
    pub pod_name: String,
}

impl ServiceIdentity {
    pub fn new(
        title: impl Into<String>,
        version: impl Into<String>,
        pod_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            pod_name: pod_name.into(),
        }
    }
}

/// Host resource usage at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostSample {
    /// Host CPU utilization since the previous sample, rounded to one decimal
    pub cpu_percent: f64,
    /// Host memory in use, in MB (bytes / 1024^2), unrounded
    pub memory_used_mb: f64,
}

/// Body of `GET /get_info`
///
/// The resource fields are omitted when the service runs without metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoResponse {
    #[serde(rename = "APP_TITLE")]
    pub app_title: String,
    #[serde(rename = "APP_VERSION")]
    pub app_version: String,
    #[serde(rename = "POD_NAME", skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
    #[serde(rename = "CPU_UTILIZATION", skip_serializing_if = "Option::is_none")]
    pub cpu_utilization: Option<f64>,
    #[serde(rename = "MEMORY_USAGE_MB", skip_serializing_if = "Option::is_none")]
    pub memory_usage_mb: Option<f64>,
}

impl InfoResponse {
    /// Identity-only body
    pub fn identity(identity: &ServiceIdentity) -> Self {
        Self {
            app_title: identity.title.clone(),
            app_version: identity.version.clone(),
            pod_name: None,
            cpu_utilization: None,
            memory_usage_mb: None,
        }
    }

    /// Full body with the sampled host usage
    pub fn with_sample(identity: &ServiceIdentity, sample: HostSample) -> Self {
        Self {
            pod_name: Some(identity.pod_name.clone()),
            cpu_utilization: Some(sample.cpu_percent),
            memory_usage_mb: Some(round_to(sample.memory_used_mb, 2)),
            ..Self::identity(identity)
        }
    }
}

/// Round `value` to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ServiceIdentity {
        ServiceIdentity::new("Title", "1.0", "pod-a")
    }

    #[test]
    fn test_identity_body_skips_resource_fields() {
        let json = serde_json::to_value(InfoResponse::identity(&identity())).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 2);
        assert_eq!(json["APP_TITLE"], "Title");
        assert_eq!(json["APP_VERSION"], "1.0");
    }

    #[test]
    fn test_full_body_rounds_memory_only() {
        let sample = HostSample {
            cpu_percent: 12.5,
            memory_used_mb: 2048.123456,
        };
        let body = InfoResponse::with_sample(&identity(), sample);

        assert_eq!(body.pod_name.as_deref(), Some("pod-a"));
        assert_eq!(body.cpu_utilization, Some(12.5));
        assert_eq!(body.memory_usage_mb, Some(2048.12));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(33.349, 1), 33.3);
        assert_eq!(round_to(0.0, 2), 0.0);
    }
}
