//! streamvault.cc seals its source JSON with AES-256-GCM. The key is a
//! hex attribute on the player element, the nonce rides as the first 12
//! bytes of the base64 payload from the source API.

use std::sync::OnceLock;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::traits::Extractor;
use media_catalog_models::{Subtitle, Video, VideoFormat};

/// AES-GCM nonce size (96 bits / 12 bytes)
const NONCE_SIZE: usize = 12;

pub struct StreamVault {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SourceResponse {
    payload: String,
}

#[derive(Debug, Deserialize)]
struct SealedSources {
    file: String,
    #[serde(default)]
    subtitles: Vec<SealedSubtitle>,
}

#[derive(Debug, Deserialize)]
struct SealedSubtitle {
    lang: String,
    url: String,
    #[serde(default)]
    default: bool,
}

fn key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"data-key="([0-9a-f]{64})""#).unwrap())
}

fn video_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/v/([A-Za-z0-9]+)").unwrap())
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, ProviderError> {
    if hex.len() % 2 != 0 {
        return Err(ProviderError::parse("odd-length hex key"));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ProviderError::parse("key is not hex"))
        })
        .collect()
}

/// Open the sealed payload: base64 -> nonce || ciphertext -> plaintext.
fn open_payload(payload_b64: &str, key_hex: &str) -> Result<String, ProviderError> {
    let key_bytes = decode_hex(key_hex)?;
    if key_bytes.len() != 32 {
        return Err(ProviderError::parse(format!(
            "expected 32-byte key, got {}",
            key_bytes.len()
        )));
    }

    let data = STANDARD
        .decode(payload_b64)
        .map_err(|e| ProviderError::parse(format!("payload is not base64: {e}")))?;
    if data.len() <= NONCE_SIZE {
        return Err(ProviderError::parse("payload shorter than nonce"));
    }
    let (nonce, ciphertext) = data.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let plain = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| ProviderError::parse("payload failed authentication (key rotated?)"))?;

    String::from_utf8(plain).map_err(|_| ProviderError::parse("plaintext is not utf-8"))
}

impl StreamVault {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extractor for StreamVault {
    fn name(&self) -> &str {
        "streamvault"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("streamvault.")
    }

    async fn extract(&self, url: &str) -> Result<Video, ProviderError> {
        let video_id = video_id_re()
            .captures(url)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| ProviderError::parse(format!("unrecognized embed url: {url}")))?;

        let page = self.client.get(url).send().await?.text().await?;
        let key_hex = key_re()
            .captures(&page)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| ProviderError::parse("player element has no data-key"))?;

        let origin = url
            .find("://")
            .map(|i| {
                let rest = &url[i + 3..];
                let end = rest.find('/').unwrap_or(rest.len());
                format!("{}://{}", &url[..i], &rest[..end])
            })
            .unwrap_or_else(|| url.to_string());

        let response: SourceResponse = self
            .client
            .get(format!("{}/api/source/{}", origin, video_id))
            .header("Referer", url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let plain = open_payload(&response.payload, &key_hex)?;
        let sources: SealedSources =
            serde_json::from_str(&plain).map_err(|e| ProviderError::parse(e.to_string()))?;

        let mut video = Video::new(&sources.file, VideoFormat::from_url(&sources.file))
            .with_header("Referer", url.to_string());
        for sub in sources.subtitles {
            let mut subtitle = Subtitle::new(sub.lang, sub.url);
            subtitle.default = sub.default;
            video.push_subtitle(subtitle);
        }
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes_gcm::aead::AeadCore;
    use aes_gcm::aead::OsRng;

    fn seal(plain: &str, key_hex: &str) -> String {
        let key_bytes = decode_hex(key_hex).unwrap();
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher.encrypt(&nonce, plain.as_bytes()).unwrap();
        let mut data = nonce.to_vec();
        data.extend(ciphertext);
        STANDARD.encode(data)
    }

    const KEY: &str = "9f2d4c6e8a0b1c3d5e7f90a1b2c3d4e5f60718293a4b5c6d7e8f901a2b3c4d5e";

    #[test]
    fn test_open_payload_round_trip() {
        let plain = r#"{"file":"https://cdn.streamvault.cc/hls/q/master.m3u8","subtitles":[{"lang":"English","url":"https://cdn.streamvault.cc/s/en.vtt","default":true}]}"#;
        let sealed = seal(plain, KEY);

        let opened = open_payload(&sealed, KEY).unwrap();
        assert_eq!(opened, plain);

        let sources: SealedSources = serde_json::from_str(&opened).unwrap();
        assert_eq!(sources.file, "https://cdn.streamvault.cc/hls/q/master.m3u8");
        assert!(sources.subtitles[0].default);
    }

    #[test]
    fn test_open_payload_rejects_wrong_key() {
        let sealed = seal(r#"{"file":"x"}"#, KEY);
        let other = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
        assert!(matches!(
            open_payload(&sealed, other),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_open_payload_rejects_truncated_data() {
        assert!(open_payload(&STANDARD.encode([0u8; 8]), KEY).is_err());
    }
}
