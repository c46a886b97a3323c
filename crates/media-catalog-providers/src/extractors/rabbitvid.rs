//! rabbitvid.net serves a sources JSON whose `sources` field is base64 of
//! the plaintext XORed with a rolling key; the key itself sits in an
//! inline script on the embed page and rotates every few days.

use std::sync::OnceLock;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::traits::Extractor;
use media_catalog_models::{Subtitle, Video, VideoFormat};

pub struct RabbitVid {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SourcesResponse {
    sources: String,
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    encrypted: bool,
}

#[derive(Debug, Deserialize)]
struct Track {
    file: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    default: bool,
}

#[derive(Debug, Deserialize)]
struct DecodedSource {
    file: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

fn key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"var\s+_0xk\s*=\s*'([0-9a-f]+)'"#).unwrap())
}

fn embed_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/embed-\d+/([A-Za-z0-9]+)").unwrap())
}

/// XOR the payload with a repeating key.
fn xor_decrypt(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

fn decode_sources(encoded: &str, key: &str) -> Result<Vec<DecodedSource>, ProviderError> {
    let cipher = STANDARD
        .decode(encoded)
        .map_err(|e| ProviderError::parse(format!("sources field is not base64: {e}")))?;
    let plain = xor_decrypt(&cipher, key.as_bytes());
    let plain = String::from_utf8(plain)
        .map_err(|_| ProviderError::parse("decrypted sources are not utf-8 (key rotated?)"))?;
    serde_json::from_str(&plain).map_err(|e| ProviderError::parse(e.to_string()))
}

impl RabbitVid {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn origin(url: &str) -> String {
        url.find("://")
            .and_then(|scheme_end| {
                let rest = &url[scheme_end + 3..];
                let host_end = rest.find('/').unwrap_or(rest.len());
                Some(format!("{}://{}", &url[..scheme_end], &rest[..host_end]))
            })
            .unwrap_or_else(|| url.to_string())
    }
}

#[async_trait]
impl Extractor for RabbitVid {
    fn name(&self) -> &str {
        "rabbitvid"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("rabbitvid.") || url.contains("rbtcloud.")
    }

    async fn extract(&self, url: &str) -> Result<Video, ProviderError> {
        let embed_id = embed_id_re()
            .captures(url)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| ProviderError::parse(format!("unrecognized embed url: {url}")))?;
        let origin = Self::origin(url);

        let page = self.client.get(url).send().await?.text().await?;
        let key = key_re()
            .captures(&page)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| ProviderError::parse("embed page has no key script"))?;

        let sources_url = format!("{}/ajax/embed/{}/getSources", origin, embed_id);
        let response: SourcesResponse = self
            .client
            .get(&sources_url)
            .header("Referer", url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let sources = if response.encrypted {
            decode_sources(&response.sources, &key)?
        } else {
            serde_json::from_str(&response.sources)
                .map_err(|e| ProviderError::parse(e.to_string()))?
        };

        let source = sources
            .first()
            .ok_or_else(|| ProviderError::parse("empty source list"))?;
        let format = match source.kind.as_deref() {
            Some("hls") => VideoFormat::Hls,
            Some("mp4") => VideoFormat::Mp4,
            _ => VideoFormat::from_url(&source.file),
        };

        let mut video = Video::new(&source.file, format)
            .with_header("Referer", url.to_string())
            .with_header("Origin", origin);

        for track in response.tracks {
            if track.kind.as_deref() == Some("thumbnails") {
                continue;
            }
            let mut subtitle =
                Subtitle::new(track.label.unwrap_or_else(|| "Unknown".to_string()), track.file);
            subtitle.default = track.default;
            video.push_subtitle(subtitle);
        }

        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_decrypt_round_trip() {
        let plain = br#"[{"file":"https://cdn.rabbitvid.net/hls/master.m3u8","type":"hls"}]"#;
        let key = b"4fa91c0d22";
        let cipher = xor_decrypt(plain, key);
        assert_ne!(cipher, plain.to_vec());
        assert_eq!(xor_decrypt(&cipher, key), plain.to_vec());
    }

    #[test]
    fn test_decode_sources() {
        let plain = r#"[{"file":"https://cdn.rabbitvid.net/hls/master.m3u8","type":"hls"}]"#;
        let key = "4fa91c0d22";
        let encoded = STANDARD.encode(xor_decrypt(plain.as_bytes(), key.as_bytes()));

        let sources = decode_sources(&encoded, key).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].file, "https://cdn.rabbitvid.net/hls/master.m3u8");
        assert_eq!(sources[0].kind.as_deref(), Some("hls"));
    }

    #[test]
    fn test_decode_sources_wrong_key_fails() {
        let plain = r#"[{"file":"https://cdn.rabbitvid.net/x.m3u8"}]"#;
        let encoded = STANDARD.encode(xor_decrypt(plain.as_bytes(), b"rightkey"));
        assert!(decode_sources(&encoded, "wrongkey").is_err());
    }

    #[test]
    fn test_embed_id_parsing() {
        let caps = embed_id_re()
            .captures("https://rabbitvid.net/embed-4/kAhp3Vxz9?z=")
            .unwrap();
        assert_eq!(&caps[1], "kAhp3Vxz9");
    }
}
