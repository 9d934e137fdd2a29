use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::PreviewConfig;
use crate::relay::{Platform, RelayPayload};

/// How a preview should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    /// A platform player iframe.
    Embed,
    /// An HLS playlist served by the media server.
    Hls,
    /// A URL the operator supplied, used as-is.
    Direct,
}

/// Where a preview came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewSource {
    Ingest,
    Youtube,
    Facebook,
    Twitch,
    Custom,
}

impl From<Platform> for PreviewSource {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Youtube => PreviewSource::Youtube,
            Platform::Facebook => PreviewSource::Facebook,
            Platform::Twitch => PreviewSource::Twitch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub source: PreviewSource,
    pub kind: PreviewKind,
    pub url: String,
}

/// Request body for preview resolution: relay keys plus the local ingest name.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct PreviewPayload {
    #[serde(flatten)]
    pub targets: RelayPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest: Option<String>,
}

/// Resolves preview URLs from stream keys.
#[derive(Debug, Clone)]
pub struct PreviewResolver {
    twitch_parent: String,
    hls_base_url: Option<String>,
}

impl PreviewResolver {
    pub fn new(twitch_parent: impl Into<String>, hls_base_url: Option<String>) -> Self {
        Self {
            twitch_parent: twitch_parent.into(),
            hls_base_url: hls_base_url.map(|base| base.trim_end_matches('/').to_string()),
        }
    }

    pub fn from_config(config: &PreviewConfig) -> Self {
        Self::new(&config.twitch_parent, config.hls_base_url.clone())
    }

    /// Previews in display order: local ingest, platforms, then custom URLs.
    pub fn resolve(&self, payload: &PreviewPayload) -> Vec<Preview> {
        let mut previews = Vec::new();

        if let Some(url) = non_empty(payload.ingest.as_deref()).and_then(|ingest| self.hls_url(ingest)) {
            previews.push(Preview {
                source: PreviewSource::Ingest,
                kind: PreviewKind::Hls,
                url,
            });
        }

        for platform in Platform::ALL {
            let Some(key) = non_empty(payload.targets.key_for(platform)) else {
                continue;
            };
            let resolved = if is_http_url(key) {
                Some((PreviewKind::Direct, key.to_string()))
            } else {
                self.embed_url(platform, key).map(|url| (PreviewKind::Embed, url))
            };
            if let Some((kind, url)) = resolved {
                previews.push(Preview {
                    source: platform.into(),
                    kind,
                    url,
                });
            }
        }

        for raw in &payload.targets.custom {
            if let Some(url) = non_empty(Some(raw.as_str())).filter(|u| is_http_url(u)) {
                previews.push(Preview {
                    source: PreviewSource::Custom,
                    kind: PreviewKind::Direct,
                    url: url.to_string(),
                });
            }
        }

        previews
    }

    /// `<base>/live/<ingest>.m3u8`, with the stream name as one encoded segment.
    fn hls_url(&self, ingest: &str) -> Option<String> {
        let mut url = Url::parse(self.hls_base_url.as_deref()?).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("live")
            .push(&format!("{}.m3u8", ingest));
        Some(url.into())
    }

    fn embed_url(&self, platform: Platform, key: &str) -> Option<String> {
        let url = match platform {
            Platform::Youtube => {
                let mut url = Url::parse("https://www.youtube.com/embed").ok()?;
                url.path_segments_mut().ok()?.push(key);
                url
            }
            Platform::Facebook => {
                Url::parse_with_params("https://www.facebook.com/video/embed", &[("video_id", key)]).ok()?
            }
            Platform::Twitch => Url::parse_with_params(
                "https://player.twitch.tv/",
                &[("channel", key), ("parent", self.twitch_parent.as_str())],
            )
            .ok()?,
        };
        Some(url.into())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> PreviewPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_platform_embeds() {
        let resolver = PreviewResolver::new("dash.example.com", None);
        let previews = resolver.resolve(&payload(
            r#"{"twitch":"somechannel","facebook":"123456","youtube":"dQw4w9WgXcQ"}"#,
        ));

        assert_eq!(
            previews,
            vec![
                Preview {
                    source: PreviewSource::Youtube,
                    kind: PreviewKind::Embed,
                    url: "https://www.youtube.com/embed/dQw4w9WgXcQ".into(),
                },
                Preview {
                    source: PreviewSource::Facebook,
                    kind: PreviewKind::Embed,
                    url: "https://www.facebook.com/video/embed?video_id=123456".into(),
                },
                Preview {
                    source: PreviewSource::Twitch,
                    kind: PreviewKind::Embed,
                    url: "https://player.twitch.tv/?channel=somechannel&parent=dash.example.com".into(),
                },
            ]
        );
    }

    #[test]
    fn test_http_keys_pass_through() {
        let resolver = PreviewResolver::new("localhost", None);
        let previews = resolver.resolve(&payload(
            r#"{"youtube":"https://youtu.be/live/abc","custom":["https://player.example.com/x","rtmp://h/a/k"]}"#,
        ));

        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].kind, PreviewKind::Direct);
        assert_eq!(previews[0].url, "https://youtu.be/live/abc");
        assert_eq!(previews[1].source, PreviewSource::Custom);
        assert_eq!(previews[1].url, "https://player.example.com/x");
    }

    #[test]
    fn test_ingest_hls_first_when_configured() {
        let resolver = PreviewResolver::new("localhost", Some("http://srs.local:8080/".into()));
        let previews = resolver.resolve(&payload(r#"{"ingest":"obs","twitch":"chan"}"#));

        assert_eq!(previews[0].kind, PreviewKind::Hls);
        assert_eq!(previews[0].url, "http://srs.local:8080/live/obs.m3u8");
        assert_eq!(previews[1].source, PreviewSource::Twitch);

        let unconfigured = PreviewResolver::new("localhost", None);
        assert!(unconfigured.resolve(&payload(r#"{"ingest":"obs"}"#)).is_empty());
    }

    #[test]
    fn test_ingest_name_stays_one_path_segment() {
        let resolver = PreviewResolver::new("localhost", Some("http://srs.local:8080/hls/".into()));
        let hls = |ingest: &str| {
            let body = serde_json::json!({ "ingest": ingest }).to_string();
            resolver.resolve(&payload(&body)).remove(0).url
        };

        assert_eq!(hls("obs"), "http://srs.local:8080/hls/live/obs.m3u8");
        assert_eq!(hls("a?b"), "http://srs.local:8080/hls/live/a%3Fb.m3u8");
        assert_eq!(hls("../x"), "http://srs.local:8080/hls/live/..%2Fx.m3u8");
        assert_eq!(hls("cam#1"), "http://srs.local:8080/hls/live/cam%231.m3u8");
    }

    #[test]
    fn test_blank_keys_have_no_preview() {
        let resolver = PreviewResolver::new("localhost", None);
        assert!(resolver
            .resolve(&payload(r#"{"youtube":"  ","facebook":"","custom":[" "]}"#))
            .is_empty());
    }

    #[test]
    fn test_keys_are_url_encoded() {
        let resolver = PreviewResolver::new("localhost", None);
        let previews = resolver.resolve(&payload(r#"{"facebook":"a&b=c"}"#));
        assert_eq!(previews[0].url, "https://www.facebook.com/video/embed?video_id=a%26b%3Dc");
    }
}
