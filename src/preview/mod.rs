//! Preview URL resolution.
//!
//! The dashboard shows a live preview next to each stream key. This module
//! maps the same keys it submits for relaying to URLs a browser can embed:
//! platform players for YouTube/Facebook/Twitch, the media server's own HLS
//! output for the local ingest, and http(s) URLs passed through unchanged.
//! Nothing here touches the relay config file.

pub mod resolver;

pub use resolver::{Preview, PreviewKind, PreviewPayload, PreviewResolver, PreviewSource};
