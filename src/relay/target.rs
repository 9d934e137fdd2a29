//! Relay targets and request normalization.
//!
//! # Responsibilities
//! - Define the fixed set of relay platforms and their ingest endpoints
//! - Normalize raw stream keys (trim, empty means absent)
//! - Enforce the key policy before anything reaches the renderer
//! - Validate custom RTMP targets
//!
//! # Design Decisions
//! - `RelayRequest::from_payload` is the single construction path for HTTP input
//! - Targets are kept sorted by `Platform`, whose declaration order is the render order
//! - Stream keys are secrets: their `Debug` output is redacted

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::relay::RelayError;

/// Characters that would let a key escape its `push ...;` directive.
const FORBIDDEN_CHARS: &[char] = &[';', '{', '}', '#', '"', '\'', '\\'];

/// A platform with a fixed ingest endpoint.
///
/// Declaration order is the order push directives are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Facebook,
    Twitch,
}

impl Platform {
    /// All platforms in render order.
    pub const ALL: [Platform; 3] = [Platform::Youtube, Platform::Facebook, Platform::Twitch];

    /// Lowercase identifier, as used in payload field names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Facebook => "facebook",
            Platform::Twitch => "twitch",
        }
    }

    /// RTMP ingest prefix; the stream key is appended verbatim.
    pub fn ingest_url(&self) -> &'static str {
        match self {
            Platform::Youtube => "rtmp://a.rtmp.youtube.com/live2/",
            Platform::Facebook => "rtmp://live-api-s.facebook.com:80/rtmp/",
            Platform::Twitch => "rtmp://live.twitch.tv/app/",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly stream keys and custom targets are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Reject values containing whitespace, control or directive-breaking characters.
    #[default]
    Strict,
    /// Pass values through unchanged; offending characters are only logged.
    Permissive,
}

impl KeyPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            KeyPolicy::Strict
        } else {
            KeyPolicy::Permissive
        }
    }
}

/// A non-empty, trimmed stream key.
#[derive(Clone, PartialEq, Eq)]
pub struct StreamKey(String);

impl StreamKey {
    /// Trim `raw`; an empty result means "no key".
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StreamKey(<redacted>)")
    }
}

/// One platform to relay to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub platform: Platform,
    pub stream_key: StreamKey,
}

impl RelayTarget {
    pub fn new(platform: Platform, stream_key: StreamKey) -> Self {
        Self { platform, stream_key }
    }

    /// Full push URL: ingest prefix + raw key.
    pub fn push_url(&self) -> String {
        format!("{}{}", self.platform.ingest_url(), self.stream_key.as_str())
    }
}

/// An operator-supplied `rtmp://` or `rtmps://` URL pushed as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct CustomTarget(String);

impl CustomTarget {
    /// Validate a custom target. Empty input yields `Ok(None)`.
    pub fn parse(raw: &str, policy: KeyPolicy) -> Result<Option<Self>, RelayError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let url = Url::parse(trimmed).map_err(|e| {
            RelayError::Validation(format!("custom target is not a valid URL: {}", e))
        })?;

        if !matches!(url.scheme(), "rtmp" | "rtmps") {
            return Err(RelayError::Validation(format!(
                "custom target must use rtmp or rtmps, got {}",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(RelayError::Validation("custom target has no host".to_string()));
        }

        check_policy(trimmed, policy, "custom target")?;
        Ok(Some(Self(trimmed.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CustomTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomTarget(<redacted>)")
    }
}

/// Wire shape of a start/preview request body.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct RelayPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitch: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<String>,
}

impl RelayPayload {
    /// Raw value submitted for `platform`, if any.
    pub fn key_for(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Youtube => self.youtube.as_deref(),
            Platform::Facebook => self.facebook.as_deref(),
            Platform::Twitch => self.twitch.as_deref(),
        }
    }
}

/// A validated set of relay targets: at most one per platform, plus custom targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayRequest {
    targets: Vec<RelayTarget>,
    custom: Vec<CustomTarget>,
}

impl RelayRequest {
    /// A request with no targets, used to clear all relays.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a request from platform targets, rejecting duplicate platforms.
    pub fn new(targets: impl IntoIterator<Item = RelayTarget>) -> Result<Self, RelayError> {
        let mut targets: Vec<RelayTarget> = targets.into_iter().collect();
        targets.sort_by_key(|t| t.platform);

        if let Some(pair) = targets.windows(2).find(|w| w[0].platform == w[1].platform) {
            return Err(RelayError::Validation(format!(
                "more than one stream key for {}",
                pair[0].platform
            )));
        }

        Ok(Self {
            targets,
            custom: Vec::new(),
        })
    }

    pub fn with_custom(mut self, custom: Vec<CustomTarget>) -> Self {
        self.custom = custom;
        self
    }

    /// Normalize an HTTP payload into a request.
    pub fn from_payload(payload: &RelayPayload, policy: KeyPolicy) -> Result<Self, RelayError> {
        let mut targets = Vec::with_capacity(Platform::ALL.len());
        for platform in Platform::ALL {
            let Some(key) = payload.key_for(platform).and_then(StreamKey::new) else {
                continue;
            };
            check_policy(key.as_str(), policy, platform.as_str())?;
            targets.push(RelayTarget::new(platform, key));
        }

        let mut custom = Vec::with_capacity(payload.custom.len());
        for raw in &payload.custom {
            if let Some(target) = CustomTarget::parse(raw, policy)? {
                custom.push(target);
            }
        }

        Ok(Self::new(targets)?.with_custom(custom))
    }

    /// Platform targets in render order.
    pub fn targets(&self) -> &[RelayTarget] {
        &self.targets
    }

    pub fn custom(&self) -> &[CustomTarget] {
        &self.custom
    }

    pub fn key_for(&self, platform: Platform) -> Option<&StreamKey> {
        self.targets
            .iter()
            .find(|t| t.platform == platform)
            .map(|t| &t.stream_key)
    }

    /// Platforms present, for logging without exposing keys.
    pub fn platforms(&self) -> Vec<Platform> {
        self.targets.iter().map(|t| t.platform).collect()
    }

    /// Number of push directives this request renders to.
    pub fn push_count(&self) -> usize {
        self.targets.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.push_count() == 0
    }
}

fn check_policy(value: &str, policy: KeyPolicy, field: &str) -> Result<(), RelayError> {
    let Some(bad) = forbidden_char(value) else {
        return Ok(());
    };

    match policy {
        KeyPolicy::Strict => Err(RelayError::Validation(format!(
            "{} contains a forbidden character ({:?})",
            field, bad
        ))),
        KeyPolicy::Permissive => {
            tracing::warn!(field = %field, "Value contains a directive-breaking character; writing it unescaped");
            Ok(())
        }
    }
}

fn forbidden_char(value: &str) -> Option<char> {
    value
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
}
