//! Service configuration

use anyhow::Result;
use serde::Deserialize;
use service_lib::{machine_hostname, ServiceIdentity};
use std::collections::HashMap;

/// Prefix for the service's own typed settings
const SETTINGS_PREFIX: &str = "POD_INFO";

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub app_title: String,
    pub app_version: String,
    pub hostname: String,
    pub listen_port: u16,
    pub metrics_enabled: bool,
}

/// Identity read from unprefixed variables (`APP_TITLE`, `APP_VERSION`, `HOSTNAME`)
///
/// Only string fields live here: every environment variable is visible to
/// this source, and a string never fails to deserialize.
#[derive(Debug, Deserialize)]
struct IdentityVars {
    #[serde(default = "default_app_title")]
    app_title: String,

    #[serde(default = "default_app_version")]
    app_version: String,

    /// Injected by Kubernetes as the pod name
    #[serde(default = "default_hostname")]
    hostname: String,
}

/// Typed settings read from `POD_INFO_*` variables
///
/// Kubernetes injects `<SERVICE>_PORT=tcp://...` and `<SERVICE>_SERVICE_PORT`
/// for every Service in the namespace, so the port is read from
/// `POD_INFO_LISTEN_PORT` rather than a bare `*_PORT` name.
#[derive(Debug, Deserialize)]
struct SettingsVars {
    /// Listener port (`POD_INFO_LISTEN_PORT`)
    #[serde(default = "default_listen_port")]
    listen_port: u16,

    /// `false` serves identity only, without metrics (`POD_INFO_METRICS_ENABLED`)
    #[serde(default = "default_metrics_enabled")]
    metrics_enabled: bool,
}

fn default_app_title() -> String {
    "DevOps for Cloud Assignment".to_string()
}

fn default_app_version() -> String {
    "1.0".to_string()
}

fn default_hostname() -> String {
    machine_hostname().unwrap_or_else(|| "unknown".to_string())
}

fn default_listen_port() -> u16 {
    8000
}

fn default_metrics_enabled() -> bool {
    true
}

impl ServiceConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_sources(
            config::Environment::default(),
            config::Environment::with_prefix(SETTINGS_PREFIX),
        )
    }

    /// Load configuration from an explicit variable map
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_sources(
            config::Environment::default().source(Some(vars.clone())),
            config::Environment::with_prefix(SETTINGS_PREFIX).source(Some(vars)),
        )
    }

    fn from_sources(identity: config::Environment, settings: config::Environment) -> Result<Self> {
        let identity: IdentityVars = config::Config::builder()
            .add_source(identity)
            .build()?
            .try_deserialize()?;
        let settings: SettingsVars = config::Config::builder()
            .add_source(settings)
            .build()?
            .try_deserialize()?;

        Ok(Self {
            app_title: identity.app_title,
            app_version: identity.app_version,
            hostname: identity.hostname,
            listen_port: settings.listen_port,
            metrics_enabled: settings.metrics_enabled,
        })
    }

    /// Listener address on all interfaces
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }

    /// Immutable identity for the lifetime of the process
    pub fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::new(&self.app_title, &self.app_version, &self.hostname)
    }
}
