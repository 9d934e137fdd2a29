//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (RELAY_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → shared via Arc to the HTTP layer and synchronizer
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; the relay file path and reload
//!   command are operator settings, never per-request input
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with, ConfigError};
pub use schema::ServiceConfig;
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, PreviewConfig, RelayConfig, ReloadFailurePolicy,
    SecurityConfig, TimeoutConfig,
};
