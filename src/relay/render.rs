//! Relay configuration rendering.
//!
//! Produces the full content of the media server's relay config file:
//!
//! ```text
//! vhost live {
//!   relay {
//!     enabled on;
//!     push rtmp://a.rtmp.youtube.com/live2/<key>;
//!   }
//! }
//! ```
//!
//! Push lines are emitted YouTube, Facebook, Twitch, then custom targets in
//! request order. Keys are appended without escaping; `RelayRequest`
//! construction is where unsafe keys get rejected.

use std::fmt::{self, Write as _};

use crate::relay::RelayRequest;

/// Virtual host the relay block is scoped to.
pub const VHOST: &str = "live";

/// Rendered config file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfig(String);

impl RenderedConfig {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of `push` directives in the block.
    pub fn push_count(&self) -> usize {
        self.0
            .lines()
            .filter(|line| line.trim_start().starts_with("push "))
            .count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render `request` into config text. Pure and deterministic.
pub fn render(request: &RelayRequest) -> RenderedConfig {
    let mut out = String::with_capacity(96 + request.push_count() * 64);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "vhost {} {{", VHOST);
    out.push_str("  relay {\n");
    out.push_str("    enabled on;\n");
    for target in request.targets() {
        let _ = writeln!(out, "    push {};", target.push_url());
    }
    for custom in request.custom() {
        let _ = writeln!(out, "    push {};", custom.as_str());
    }
    out.push_str("  }\n");
    out.push_str("}\n");

    RenderedConfig(out)
}
