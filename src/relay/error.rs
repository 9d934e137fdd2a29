//! Error definitions for relay synchronization.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while validating, writing or reloading relay config.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The caller sent a request that cannot be applied.
    #[error("Invalid relay request: {0}")]
    Validation(String),

    /// The configuration file could not be written.
    #[error("Failed to write relay config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reload command could not be spawned.
    #[error("Failed to run reload command `{command}`: {source}")]
    Execution {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The reload command did not finish within the configured bound.
    #[error("Reload command `{command}` timed out after {secs} seconds")]
    ReloadTimeout { command: String, secs: u64 },

    /// The reload command ran but reported failure (only under the `fail` policy).
    #[error("Reload command exited with status {}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    ReloadFailed { code: Option<i32>, stderr: String },
}

impl RelayError {
    /// Whether the error was caused by the client rather than the server side.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::Validation(_))
    }

    /// Short, stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "validation",
            RelayError::Io { .. } => "io",
            RelayError::Execution { .. } => "execution",
            RelayError::ReloadTimeout { .. } => "reload_timeout",
            RelayError::ReloadFailed { .. } => "reload_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_validation_is_client_error() {
        assert!(RelayError::Validation("x".into()).is_client_error());
        let timeout = RelayError::ReloadTimeout {
            command: "systemctl reload srs".into(),
            secs: 20,
        };
        assert!(!timeout.is_client_error());
        assert_eq!(timeout.kind(), "reload_timeout");
    }

    #[test]
    fn test_reload_failed_message() {
        let exited = RelayError::ReloadFailed {
            code: Some(3),
            stderr: "not running".into(),
        };
        assert_eq!(exited.to_string(), "Reload command exited with status 3: not running");

        let killed = RelayError::ReloadFailed {
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("signal"));
    }
}
