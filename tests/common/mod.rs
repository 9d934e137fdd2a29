//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::net::TcpListener;

use relay_sync::config::ServiceConfig;
use relay_sync::http::HttpServer;
use relay_sync::lifecycle::Shutdown;

/// A relay-sync server bound to an ephemeral port, writing into a temp dir.
pub struct TestServer {
    pub addr: SocketAddr,
    pub config_file: PathBuf,
    pub dir: TempDir,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Current relay config file content, empty if never written.
    pub fn config_content(&self) -> String {
        std::fs::read_to_string(&self.config_file).unwrap_or_default()
    }

    pub fn push_lines(&self) -> Vec<String> {
        self.config_content()
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("push "))
            .map(String::from)
            .collect()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server whose reload command is `reload_command`.
///
/// `customize` runs after the test defaults are applied.
pub async fn start_server<F>(reload_command: &str, customize: F) -> TestServer
where
    F: FnOnce(&mut ServiceConfig, &TempDir),
{
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("relay.conf");

    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.relay.config_file = config_file.display().to_string();
    config.relay.reload_command = reload_command.into();
    config.relay.reload_timeout_secs = 5;
    customize(&mut config, &dir);

    let config_file = PathBuf::from(&config.relay.config_file);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        config_file,
        dir,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
