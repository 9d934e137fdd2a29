//! Relay configuration synchronizer for an SRS-style media server.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod preview;
pub mod relay;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{RelayRequest, RelaySynchronizer};
