//! Relay configuration synchronization subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP payload
//!     → target.rs (normalize keys, apply key policy)
//!     → RelayRequest (validated, ordered)
//!     → synchronizer.rs (acquire gate)
//!         → render.rs (RelayRequest → config text, pure)
//!         → writer.rs (truncate + replace config file)
//!         → reload.rs (run reload command, capture ReloadResult)
//!     → SyncOutcome | RelayError
//! ```
//!
//! # Design Decisions
//! - The media server's config file is a single-writer resource; every
//!   apply/clear holds one process-wide gate for render+write+reload
//! - The file is always replaced in full, never merged
//! - Rendering is pure so identical requests give byte-identical files
//! - A non-zero reload exit is a value (`ReloadResult`), and the
//!   synchronizer's policy decides whether it becomes an error

pub mod error;
pub mod reload;
pub mod render;
pub mod synchronizer;
pub mod target;
pub mod writer;

pub use error::RelayError;
pub use reload::{ReloadInvoker, ReloadResult};
pub use render::{render, RenderedConfig};
pub use synchronizer::{RelaySynchronizer, SyncOutcome};
pub use target::{CustomTarget, KeyPolicy, Platform, RelayPayload, RelayRequest, RelayTarget, StreamKey};
pub use writer::ConfigWriter;
