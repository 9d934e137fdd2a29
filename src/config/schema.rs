//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay
//! service. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Media server config file and reload command.
    pub relay: RelayConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Preview URL settings.
    pub preview: PreviewConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}

/// What to do when the reload command exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadFailurePolicy {
    /// Log a warning and report success (the config was written).
    #[default]
    Log,
    /// Report the operation as failed.
    Fail,
}

/// Media server relay settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Config file rewritten on every apply/clear. Its content is replaced, never merged.
    pub config_file: String,

    /// Command that makes the media server pick up the new file.
    pub reload_command: String,

    /// Shell used to run `reload_command` (`<shell> -c <command>`).
    pub shell: String,

    /// Upper bound on the reload command in seconds (0 = wait forever).
    pub reload_timeout_secs: u64,

    /// Whether a non-zero reload exit fails the request.
    pub on_reload_failure: ReloadFailurePolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            config_file: "/usr/local/srs/conf/relay.conf".to_string(),
            reload_command: "systemctl reload srs".to_string(),
            shell: "/bin/sh".to_string(),
            reload_timeout_secs: 20,
            on_reload_failure: ReloadFailurePolicy::Log,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Reject stream keys that could break out of a push directive.
    pub strict_validation: bool,
    /// Allow any origin, method and header (dashboards are usually served elsewhere).
    pub cors_permissive: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
            strict_validation: true,
            cors_permissive: true,
        }
    }
}

/// Preview URL configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// `parent` parameter Twitch requires for embedded players.
    pub twitch_parent: String,

    /// Base URL of the media server's HLS output (e.g., "http://srs.local:8080").
    pub hls_base_url: Option<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            twitch_parent: "localhost".to_string(),
            hls_base_url: None,
        }
    }
}
