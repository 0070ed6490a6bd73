//! Library for the pod info service
//!
//! This crate provides the core functionality for:
//! - Pod identity and info responses
//! - Host CPU and memory sampling
//! - Prometheus metrics and structured logging
//! - The HTTP router serving `/get_info` and `/metrics`

pub mod api;
pub mod error;
pub mod models;
pub mod observability;
pub mod sampler;

pub use api::{create_router, AppState};
pub use error::{ServiceError, ServiceResult};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use sampler::{machine_hostname, HostSampler, SystemSampler};
