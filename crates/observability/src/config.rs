//! Configuration for observability/telemetry

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Receives every formatted log line. Called from the tracing layer; must not block.
pub type LogSink = Arc<dyn Fn(String) + Send + Sync>;

pub const DEFAULT_SERVICE_NAME: &str = "poqt";

/// Observability configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Service name attached to exported spans
    #[serde(default = "default_service_name")]
    pub service_name: String,

    pub service_version: Option<String>,

    /// OTLP endpoint for span export (e.g., "http://localhost:4317")
    pub otlp_endpoint: Option<String>,

    /// Write formatted events to stderr
    #[serde(default)]
    pub enable_console: bool,

    /// `EnvFilter` directive; `info` when unset
    pub log_level: Option<String>,

    #[serde(default)]
    pub resource_attributes: Vec<(String, String)>,

    #[serde(skip)]
    pub log_sink: Option<LogSink>,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: None,
            otlp_endpoint: None,
            enable_console: true,
            log_level: None,
            resource_attributes: Vec::new(),
            log_sink: None,
        }
    }
}

impl std::fmt::Debug for ObservabilityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservabilityConfig")
            .field("service_name", &self.service_name)
            .field("service_version", &self.service_version)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .field("enable_console", &self.enable_console)
            .field("log_level", &self.log_level)
            .field("resource_attributes", &self.resource_attributes)
            .field("log_sink", &self.log_sink.as_ref().map(|_| "Some(LogSink)"))
            .finish()
    }
}

impl ObservabilityConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_resource_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.resource_attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `OTEL_SERVICE_NAME` → service_name (default `poqt`)
    /// - `OTEL_SERVICE_VERSION` → service_version
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` → otlp_endpoint
    /// - `POQT_LOG` or `RUST_LOG` → log_level
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            service_name: get("OTEL_SERVICE_NAME").unwrap_or_else(default_service_name),
            service_version: get("OTEL_SERVICE_VERSION"),
            // OTLP only when explicitly set; otherwise console-only
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|s| !s.is_empty()),
            log_level: get("POQT_LOG").or_else(|| get("RUST_LOG")),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn poqt_log_wins_over_rust_log() {
        let config = ObservabilityConfig::from_lookup(lookup(&[
            ("POQT_LOG", "debug"),
            ("RUST_LOG", "warn"),
        ]));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.service_name, "poqt");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn empty_endpoint_means_console_only() {
        let config =
            ObservabilityConfig::from_lookup(lookup(&[("OTEL_EXPORTER_OTLP_ENDPOINT", "")]));
        assert!(config.otlp_endpoint.is_none());
        assert!(config.enable_console);
    }

    #[test]
    fn deserialize_skips_sink() {
        let config: ObservabilityConfig =
            serde_json::from_str(r#"{"otlp_endpoint":"http://localhost:4317"}"#).unwrap();
        assert_eq!(config.service_name, "poqt");
        assert!(config.log_sink.is_none());
        assert!(!config.enable_console);
    }
}
