//! Relay synchronizer: render → write → reload under one gate.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::{RelayConfig, ReloadFailurePolicy};
use crate::observability::metrics;
use crate::relay::{render, ConfigWriter, RelayError, RelayRequest, ReloadInvoker, ReloadResult};

/// Result of a successful apply or clear.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Push directives written to the config file.
    pub pushes: usize,
    pub reload: ReloadResult,
}

/// Owns the media server's relay config file and its reload command.
///
/// Every operation holds `gate` for the whole render+write+reload chain, so
/// concurrent callers are applied one after another and each reload sees a
/// complete file.
pub struct RelaySynchronizer {
    writer: ConfigWriter,
    invoker: ReloadInvoker,
    policy: ReloadFailurePolicy,
    gate: Mutex<()>,
}

impl RelaySynchronizer {
    pub fn new(writer: ConfigWriter, invoker: ReloadInvoker, policy: ReloadFailurePolicy) -> Self {
        Self {
            writer,
            invoker,
            policy,
            gate: Mutex::new(()),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        let timeout = (config.reload_timeout_secs > 0)
            .then(|| Duration::from_secs(config.reload_timeout_secs));

        let invoker = ReloadInvoker::new(&config.shell, &config.reload_command)
            .with_timeout(timeout)
            .with_config_path(&config.config_file);

        Self::new(
            ConfigWriter::new(&config.config_file),
            invoker,
            config.on_reload_failure,
        )
    }

    /// Replace the relay config with `request` and reload the media server.
    pub async fn apply_relay(&self, request: &RelayRequest) -> Result<SyncOutcome, RelayError> {
        self.sync("apply", request).await
    }

    /// Write an empty relay block and reload.
    pub async fn clear_relay(&self) -> Result<SyncOutcome, RelayError> {
        self.sync("clear", &RelayRequest::empty()).await
    }

    async fn sync(&self, operation: &'static str, request: &RelayRequest) -> Result<SyncOutcome, RelayError> {
        let start = Instant::now();
        let result = self.sync_locked(request).await;

        match &result {
            Ok(_) => metrics::record_sync(operation, "ok", start),
            Err(e) => {
                tracing::error!(operation, error = %e, "Relay sync failed");
                metrics::record_sync(operation, e.kind(), start);
            }
        }
        result
    }

    async fn sync_locked(&self, request: &RelayRequest) -> Result<SyncOutcome, RelayError> {
        let _guard = self.gate.lock().await;

        let rendered = render(request);
        self.writer.write(&rendered).await?;
        tracing::info!(
            path = %self.writer.path().display(),
            platforms = ?request.platforms(),
            custom_targets = request.custom().len(),
            "Relay config updated"
        );

        let reload = self.invoker.reload().await?;
        metrics::record_reload(reload.success);

        if reload.success {
            tracing::info!(command = %self.invoker.command(), "Media server reloaded");
        } else {
            match self.policy {
                ReloadFailurePolicy::Log => {
                    tracing::warn!(
                        command = %self.invoker.command(),
                        code = ?reload.code,
                        stderr = %reload.stderr.trim_end(),
                        "Reload command reported failure; keeping written config"
                    );
                }
                ReloadFailurePolicy::Fail => {
                    return Err(RelayError::ReloadFailed {
                        code: reload.code,
                        stderr: reload.stderr.trim_end().to_string(),
                    });
                }
            }
        }

        Ok(SyncOutcome {
            pushes: request.push_count(),
            reload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{Platform, RelayTarget, StreamKey};
    use std::path::Path;

    fn synchronizer(path: &Path, command: &str, policy: ReloadFailurePolicy) -> RelaySynchronizer {
        RelaySynchronizer::new(
            ConfigWriter::new(path),
            ReloadInvoker::new("/bin/sh", command).with_config_path(path),
            policy,
        )
    }

    fn youtube(key: &str) -> RelayRequest {
        RelayRequest::new(vec![RelayTarget::new(Platform::Youtube, StreamKey::new(key).unwrap())]).unwrap()
    }

    #[tokio::test]
    async fn test_apply_writes_then_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.conf");
        let sync = synchronizer(&path, "cat \"$RELAY_CONFIG_PATH\"", ReloadFailurePolicy::Log);

        let request = youtube("abc123");
        let outcome = sync.apply_relay(&request).await.unwrap();

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, render(&request).as_str());
        assert_eq!(outcome.reload.stdout, on_disk, "reload must observe the new file");
        assert_eq!(outcome.pushes, 1);
    }

    #[tokio::test]
    async fn test_clear_leaves_no_push_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.conf");
        let sync = synchronizer(&path, "true", ReloadFailurePolicy::Log);

        sync.apply_relay(&youtube("k")).await.unwrap();
        let outcome = sync.clear_relay().await.unwrap();

        assert_eq!(outcome.pushes, 0);
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, render(&RelayRequest::empty()).as_str());
        assert!(!on_disk.contains("push"));
    }

    #[tokio::test]
    async fn test_write_failure_skips_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("relay.conf");
        let marker = dir.path().join("reloaded");
        let sync = synchronizer(
            &path,
            &format!("touch '{}'", marker.display()),
            ReloadFailurePolicy::Log,
        );

        let err = sync.apply_relay(&youtube("k")).await.unwrap_err();
        assert!(matches!(err, RelayError::Io { .. }), "got {:?}", err);
        assert!(!marker.exists(), "reload must not run after a failed write");
    }

    #[tokio::test]
    async fn test_log_policy_tolerates_failed_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.conf");
        let sync = synchronizer(&path, "echo 'srs not running' >&2; exit 1", ReloadFailurePolicy::Log);

        let outcome = sync.apply_relay(&youtube("k")).await.unwrap();
        assert!(!outcome.reload.success);
        assert_eq!(outcome.reload.code, Some(1));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_fail_policy_surfaces_failed_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.conf");
        let sync = synchronizer(&path, "echo 'srs not running' >&2; exit 1", ReloadFailurePolicy::Fail);

        let err = sync.apply_relay(&youtube("k")).await.unwrap_err();
        match err {
            RelayError::ReloadFailed { code, stderr } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "srs not running");
            }
            other => panic!("expected ReloadFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.conf");
        let sync = synchronizer(&path, "true", ReloadFailurePolicy::Log);
        let request = youtube("same");

        sync.apply_relay(&request).await.unwrap();
        let once = std::fs::read(&path).unwrap();
        sync.apply_relay(&request).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), once);
    }

    #[tokio::test]
    async fn test_from_config_uses_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.conf");
        let config = RelayConfig {
            config_file: path.display().to_string(),
            reload_command: "exit 4".to_string(),
            shell: "/bin/sh".to_string(),
            reload_timeout_secs: 5,
            on_reload_failure: ReloadFailurePolicy::Fail,
        };

        let sync = RelaySynchronizer::from_config(&config);
        let err = sync.clear_relay().await.unwrap_err();
        assert!(matches!(err, RelayError::ReloadFailed { code: Some(4), .. }));
        assert!(path.exists());
    }
}
