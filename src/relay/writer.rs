//! Config file writer.
//!
//! Replaces the whole file on every call. No locking here; the
//! synchronizer's gate serializes writers.

use std::path::{Path, PathBuf};

use crate::relay::{RelayError, RenderedConfig};

/// Writes rendered relay config to a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigWriter {
    path: PathBuf,
}

impl ConfigWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the file and replace its content. Not retried on failure.
    pub async fn write(&self, content: &RenderedConfig) -> Result<(), RelayError> {
        write_config(&self.path, content.as_bytes()).await
    }
}

/// Truncate-and-replace `path` with `content`.
pub async fn write_config(path: &Path, content: &[u8]) -> Result<(), RelayError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| RelayError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "Relay config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{render, Platform, RelayRequest, RelayTarget, StreamKey};

    #[tokio::test]
    async fn test_write_replaces_entire_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.conf");
        std::fs::write(&path, "# hand-written\n".repeat(50)).unwrap();

        let writer = ConfigWriter::new(&path);
        let request = RelayRequest::new(vec![RelayTarget::new(
            Platform::Youtube,
            StreamKey::new("k").unwrap(),
        )])
        .unwrap();
        let rendered = render(&request);
        writer.write(&rendered).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), rendered.as_str());

        let cleared = render(&RelayRequest::empty());
        writer.write(&cleared).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), cleared.as_str());
    }

    #[tokio::test]
    async fn test_write_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.conf");

        write_config(&path, b"vhost live {}\n").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"vhost live {}\n");
    }

    #[tokio::test]
    async fn test_write_failure_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("relay.conf");

        let err = write_config(&path, b"x").await.unwrap_err();
        match err {
            RelayError::Io { path: failed, source } => {
                assert_eq!(failed, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
