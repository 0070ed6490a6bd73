//! Host resource sampling
//!
//! CPU utilization is computed by `sysinfo` as the delta between two
//! refreshes, so the sampler keeps one `System` alive for the whole process.
//! The baseline is taken when the sampler is created.

use crate::error::{ServiceError, ServiceResult};
use crate::models::{round_to, HostSample};
use std::sync::Mutex;
use sysinfo::System;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Source of host CPU and memory readings
pub trait HostSampler: Send + Sync {
    /// Take one reading of host CPU utilization and memory in use
    fn sample(&self) -> ServiceResult<HostSample>;
}

/// `sysinfo`-backed sampler for the machine the service runs on
pub struct SystemSampler {
    system: Mutex<System>,
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        // Prime the CPU counters so the next refresh has a baseline
        system.refresh_cpu();
        Self {
            system: Mutex::new(system),
        }
    }
}

impl HostSampler for SystemSampler {
    fn sample(&self) -> ServiceResult<HostSample> {
        let mut system = self
            .system
            .lock()
            .map_err(|e| ServiceError::Sampling(format!("sampler lock poisoned: {}", e)))?;

        system.refresh_cpu();
        system.refresh_memory();

        let cpu_percent = system.global_cpu_info().cpu_usage() as f64;
        if !cpu_percent.is_finite() {
            return Err(ServiceError::Sampling(format!(
                "invalid CPU reading: {}",
                cpu_percent
            )));
        }

        Ok(HostSample {
            cpu_percent: round_to(cpu_percent, 1),
            memory_used_mb: system.used_memory() as f64 / BYTES_PER_MB,
        })
    }
}

/// Network hostname of this machine, if it can be determined
pub fn machine_hostname() -> Option<String> {
    System::host_name().filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_sampler_reports_sane_values() {
        let sampler = SystemSampler::new();
        let sample = sampler.sample().unwrap();

        assert!(sample.cpu_percent >= 0.0);
        assert!(sample.memory_used_mb >= 0.0);
        assert_eq!(round_to(sample.cpu_percent, 1), sample.cpu_percent);
    }

    #[test]
    fn test_system_sampler_can_be_sampled_repeatedly() {
        let sampler = SystemSampler::default();
        for _ in 0..3 {
            assert!(sampler.sample().is_ok());
        }
    }
}
