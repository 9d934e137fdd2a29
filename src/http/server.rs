//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS)
//! - Build the relay synchronizer and preview resolver from config
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::preview::PreviewResolver;
use crate::relay::{KeyPolicy, RelaySynchronizer};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub synchronizer: Arc<RelaySynchronizer>,
    pub previews: Arc<PreviewResolver>,
    pub key_policy: KeyPolicy,
    pub bind_address: Arc<str>,
}

/// HTTP server for the relay API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let synchronizer = Arc::new(RelaySynchronizer::from_config(&config.relay));
        Self::with_synchronizer(config, synchronizer)
    }

    /// Create a server around an existing synchronizer.
    pub fn with_synchronizer(config: ServiceConfig, synchronizer: Arc<RelaySynchronizer>) -> Self {
        let state = AppState {
            synchronizer,
            previews: Arc::new(PreviewResolver::from_config(&config.preview)),
            key_policy: KeyPolicy::from_strict(config.security.strict_validation),
            bind_address: Arc::from(config.listener.bind_address.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", get(handlers::banner))
            .route("/api/status", get(handlers::status))
            .route("/api/startRelay", post(handlers::start_relay))
            .route("/api/stopRelay", post(handlers::stop_relay))
            .route("/api/previews", post(handlers::previews))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request.headers().request_id(),
                )
            }))
            .layer(set_request_id_layer());

        if config.security.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            config_file = %self.config.relay.config_file,
            reload_command = %self.config.relay.reload_command,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
