//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Endpoint picker integration.
    pub epp: EppConfig,

    /// Client-facing locations.
    pub locations: Vec<LocationConfig>,

    /// Locations reachable only through internal redirect.
    pub internal_locations: Vec<InternalLocationConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for the request pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Connection establishment timeout towards upstreams in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Endpoint picker (EPP) settings shared by every location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EppConfig {
    /// Names of the request-scoped variables the interception stage reads and writes.
    pub variables: VariableNames,

    /// The one extra request header copied into the serialized context.
    pub selection_header: String,

    /// Upper bound on a single resolution call, in milliseconds.
    pub resolve_timeout_ms: u64,

    /// Which resolution engine to call.
    pub resolver: ResolverConfig,
}

impl Default for EppConfig {
    fn default() -> Self {
        Self {
            variables: VariableNames::default(),
            selection_header: "test-epp-endpoint-selection".to_string(),
            resolve_timeout_ms: 5_000,
            resolver: ResolverConfig::default(),
        }
    }
}

/// Variable names bound at startup.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct VariableNames {
    pub host: String,
    pub port: String,
    pub internal_path: String,
    pub endpoint: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            host: "epp_host".to_string(),
            port: "epp_port".to_string(),
            internal_path: "epp_internal_path".to_string(),
            endpoint: "inference_workload_endpoint".to_string(),
        }
    }
}

/// Resolution engine selection.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// Picks the endpoint from the selection header (development and tests).
    #[default]
    Header,
    /// Asks an endpoint picker shim over HTTP.
    Http,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResolverConfig {
    pub kind: ResolverKind,

    /// Base URL of the picker shim (required for `http`).
    pub picker_url: Option<String>,
}

/// Client-facing location.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    /// Location identifier for logging.
    pub name: String,

    /// Host header to match (exact match).
    #[serde(default)]
    pub host: Option<String>,

    /// Path prefix to match.
    pub path_prefix: String,

    /// Location priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,

    /// Run the endpoint picker for requests on this location.
    #[serde(default = "default_epp_enabled")]
    pub epp_enabled: bool,

    /// Request-scoped variables seeded for every request on this location.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    /// Upstream ("host:port") serving requests the endpoint picker does not
    /// intercept. Without one such requests get 404.
    #[serde(default)]
    pub upstream: Option<String>,
}

fn default_epp_enabled() -> bool {
    true
}

/// What an internal location does when no endpoint was picked.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Forward to the fallback upstream.
    #[default]
    FailOpen,
    /// Respond 503.
    FailClose,
}

/// Destination reachable only via internal redirect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InternalLocationConfig {
    /// Exact path the redirect targets.
    pub path: String,

    #[serde(default)]
    pub failure_mode: FailureMode,

    /// Upstream address ("host:port") used when no endpoint was picked.
    #[serde(default)]
    pub fallback_upstream: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.epp.variables.endpoint, "inference_workload_endpoint");
        assert_eq!(config.epp.selection_header, "test-epp-endpoint-selection");
        assert_eq!(config.epp.resolver.kind, ResolverKind::Header);
        assert!(config.locations.is_empty());
    }

    #[test]
    fn test_parse_location() {
        let raw = r#"
            [epp.resolver]
            kind = "http"
            picker_url = "http://127.0.0.1:54800"

            [[locations]]
            name = "llm"
            path_prefix = "/v1/"

            [locations.variables]
            epp_host = "picker.default.svc"
            epp_port = "9002"
            epp_internal_path = "/_epp/pool-a"

            [[internal_locations]]
            path = "/_epp/pool-a"
            failure_mode = "fail_close"
        "#;
        let config: GatewayConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.epp.resolver.kind, ResolverKind::Http);
        assert!(config.locations[0].epp_enabled);
        assert_eq!(config.locations[0].variables["epp_port"], "9002");
        assert_eq!(config.internal_locations[0].failure_mode, FailureMode::FailClose);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
