//! moonplay.site wraps its jwplayer setup in the classic
//! `eval(function(p,a,c,k,e,d)...)` packer. Unpacking is enough; the
//! file URL sits in plain sight once the token substitution is undone.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::ProviderError;
use crate::traits::Extractor;
use media_catalog_models::{Subtitle, Video, VideoFormat};

pub struct MoonPlay {
    client: reqwest::Client,
}

fn packed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)eval\(function\(p,a,c,k,e,d\).*?\}\('(?<p>.*?)',\s*(?<a>\d+),\s*(?<c>\d+),\s*'(?<k>[^']*)'\.split\('\|'\)",
        )
        .unwrap()
    })
}

fn file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"file\s*:\s*"(?<url>[^"]+)""#).unwrap())
}

fn captions_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{file\s*:\s*"(?<file>[^"]+)"\s*,\s*label\s*:\s*"(?<label>[^"]+)"\s*,\s*kind\s*:\s*"captions""#)
            .unwrap()
    })
}

/// The packer's radix encoding: digits 0-9a-z below 36, then
/// upper-case letters produced by `String.fromCharCode(c + 29)`.
fn encode_token(num: u64, base: u64) -> String {
    let quotient = num / base;
    let remainder = num % base;
    let mut token = if quotient > 0 {
        encode_token(quotient, base)
    } else {
        String::new()
    };
    if remainder > 35 {
        token.push((remainder as u8 + 29) as char);
    } else {
        token.push(std::char::from_digit(remainder as u32, 36).expect("remainder fits radix 36"));
    }
    token
}

/// Undo the token substitution: every dictionary word replaces its
/// encoded token, highest index first so "10" is handled before "1".
fn unpack(payload: &str, base: u64, count: u64, words: &[&str]) -> Result<String, ProviderError> {
    if words.len() != count as usize {
        return Err(ProviderError::parse(format!(
            "packer dictionary length {} does not match count {}",
            words.len(),
            count
        )));
    }

    let mut source = payload.to_string();
    for index in (0..count).rev() {
        let word = words[index as usize];
        if word.is_empty() {
            continue;
        }
        let token = encode_token(index, base);
        let re = Regex::new(&format!(r"\b{}\b", regex::escape(&token)))
            .map_err(|e| ProviderError::parse(e.to_string()))?;
        source = re.replace_all(&source, word).into_owned();
    }
    Ok(source)
}

fn unpack_page(html: &str) -> Result<String, ProviderError> {
    let caps = packed_re()
        .captures(html)
        .ok_or_else(|| ProviderError::parse("no packed script found"))?;

    let base: u64 = caps["a"]
        .parse()
        .map_err(|_| ProviderError::parse("bad packer base"))?;
    let count: u64 = caps["c"]
        .parse()
        .map_err(|_| ProviderError::parse("bad packer count"))?;
    let words: Vec<&str> = caps.name("k").map(|k| k.as_str().split('|').collect()).unwrap_or_default();

    unpack(&caps["p"], base, count, &words)
}

impl MoonPlay {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extractor for MoonPlay {
    fn name(&self) -> &str {
        "moonplay"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("moonplay.") || url.contains("mpcontent.")
    }

    async fn extract(&self, url: &str) -> Result<Video, ProviderError> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let unpacked = unpack_page(&html)?;
        let caps = file_re()
            .captures(&unpacked)
            .ok_or_else(|| ProviderError::parse("unpacked player has no file url"))?;
        let stream_url = caps["url"].to_string();

        let mut video = Video::new(&stream_url, VideoFormat::from_url(&stream_url))
            .with_header("Referer", url.to_string());

        for caption in captions_re().captures_iter(&unpacked) {
            video.push_subtitle(Subtitle::new(&caption["label"], &caption["file"]));
        }

        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_token_radix() {
        assert_eq!(encode_token(0, 62), "0");
        assert_eq!(encode_token(10, 62), "a");
        assert_eq!(encode_token(35, 62), "z");
        assert_eq!(encode_token(36, 62), "A");
        assert_eq!(encode_token(61, 62), "Z");
        assert_eq!(encode_token(62, 62), "10");
    }

    #[test]
    fn test_unpack_substitutes_tokens() {
        let words = ["player", "setup", "file", "https://cdn.moonplay.site/h/master.m3u8"];
        let unpacked = unpack(r#"0.1({2:"3"})"#, 10, 4, &words).unwrap();
        assert_eq!(
            unpacked,
            r#"player.setup({file:"https://cdn.moonplay.site/h/master.m3u8"})"#
        );
    }

    #[test]
    fn test_unpack_page_end_to_end() {
        let html = concat!(
            r#"<script>eval(function(p,a,c,k,e,d){e=function(c){return c};while(c--){if(k[c]){p=p.replace(new RegExp('\\b'+e(c)+'\\b','g'),k[c])}}return p}"#,
            r#"('0.1({2:"3"})',10,4,'player|setup|file|https://cdn.moonplay.site/h/master.m3u8'.split('|'),0,{}))</script>"#
        );
        let unpacked = unpack_page(html).unwrap();
        let caps = file_re().captures(&unpacked).unwrap();
        assert_eq!(&caps["url"], "https://cdn.moonplay.site/h/master.m3u8");
    }

    #[test]
    fn test_unpack_page_without_packer_fails() {
        assert!(matches!(
            unpack_page("<html><body>plain page</body></html>"),
            Err(ProviderError::Parse(_))
        ));
    }
}
