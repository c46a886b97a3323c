use serde::{Deserialize, Serialize};

/// A fully resolved playable unit: final URL, container format, the HTTP
/// headers the host requires, and any subtitle tracks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub source: String,
    pub format: VideoFormat,
    /// Headers the player must send (Referer, Origin, User-Agent, ...).
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub subtitles: Vec<Subtitle>,
}

impl Video {
    pub fn new(source: impl Into<String>, format: VideoFormat) -> Self {
        Self {
            source: source.into(),
            format,
            headers: Vec::new(),
            subtitles: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a subtitle track while keeping the invariant that at most
    /// one track is the default: the first default wins, later tracks get
    /// their flag cleared.
    pub fn push_subtitle(&mut self, mut subtitle: Subtitle) {
        if subtitle.default && self.subtitles.iter().any(|s| s.default) {
            subtitle.default = false;
        }
        self.subtitles.push(subtitle);
    }

    pub fn default_subtitle(&self) -> Option<&Subtitle> {
        self.subtitles.iter().find(|s| s.default)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    /// HLS manifest (.m3u8)
    Hls,
    /// Progressive MP4 file
    Mp4,
}

impl VideoFormat {
    /// Guess the format from a URL path, defaulting to HLS — hosts that
    /// hide the extension behind a token path overwhelmingly serve HLS.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
        if path.ends_with(".mp4") {
            VideoFormat::Mp4
        } else {
            VideoFormat::Hls
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            VideoFormat::Hls => "application/x-mpegURL",
            VideoFormat::Mp4 => "video/mp4",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subtitle {
    pub label: String,
    pub file: String,
    #[serde(default)]
    pub default: bool,
}

impl Subtitle {
    pub fn new(label: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            file: file.into(),
            default: false,
        }
    }
}

/// An unresolved playback candidate as scraped from a title's server list.
///
/// A server is resolvable when it carries either an `embed` URL an
/// extractor can follow, or an already-resolved `video`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Server {
    pub id: String,
    /// Human-readable label ("Vidcloud", "Server 2", ...).
    pub name: String,
    #[serde(default)]
    pub embed: Option<String>,
    #[serde(default)]
    pub video: Option<Video>,
}

impl Server {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            embed: None,
            video: None,
        }
    }

    pub fn with_embed(mut self, url: impl Into<String>) -> Self {
        self.embed = Some(url.into());
        self
    }

    pub fn with_video(mut self, video: Video) -> Self {
        self.video = Some(video);
        self
    }

    pub fn is_resolvable(&self) -> bool {
        self.embed.is_some() || self.video.is_some()
    }
}

/// Selects which provider endpoint a server lookup hits. For an episode,
/// the (tv_show_id, season, episode) triple fully determines the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoType {
    Movie {
        id: String,
    },
    Episode {
        tv_show_id: String,
        season: u32,
        episode: u32,
    },
}

impl VideoType {
    pub fn movie(id: impl Into<String>) -> Self {
        VideoType::Movie { id: id.into() }
    }

    pub fn episode(tv_show_id: impl Into<String>, season: u32, episode: u32) -> Self {
        VideoType::Episode {
            tv_show_id: tv_show_id.into(),
            season,
            episode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_subtitle_keeps_single_default() {
        let mut video = Video::new("https://cdn.example/master.m3u8", VideoFormat::Hls);

        let mut en = Subtitle::new("English", "https://cdn.example/en.vtt");
        en.default = true;
        let mut fr = Subtitle::new("French", "https://cdn.example/fr.vtt");
        fr.default = true;
        let de = Subtitle::new("German", "https://cdn.example/de.vtt");

        video.push_subtitle(en);
        video.push_subtitle(fr);
        video.push_subtitle(de);

        assert_eq!(video.subtitles.len(), 3);
        assert_eq!(video.subtitles.iter().filter(|s| s.default).count(), 1);
        assert_eq!(video.default_subtitle().unwrap().label, "English");
    }

    #[test]
    fn test_format_from_url() {
        assert_eq!(
            VideoFormat::from_url("https://cdn.example/v/file.mp4?token=abc"),
            VideoFormat::Mp4
        );
        assert_eq!(
            VideoFormat::from_url("https://cdn.example/hls/master.m3u8"),
            VideoFormat::Hls
        );
        // Extensionless token paths default to HLS
        assert_eq!(
            VideoFormat::from_url("https://cdn.example/stream/abcdef"),
            VideoFormat::Hls
        );
    }

    #[test]
    fn test_server_resolvability() {
        let bare = Server::new("1", "Server 1");
        assert!(!bare.is_resolvable());

        let embed = Server::new("2", "Vidcloud").with_embed("https://host.example/e/xyz");
        assert!(embed.is_resolvable());

        let direct = Server::new("3", "Direct")
            .with_video(Video::new("https://cdn.example/master.m3u8", VideoFormat::Hls));
        assert!(direct.is_resolvable());
    }

    #[test]
    fn test_episode_triple_identity() {
        let a = VideoType::episode("show-42", 2, 5);
        let b = VideoType::episode("show-42", 2, 5);
        let c = VideoType::episode("show-42", 2, 6);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
