use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use super::error::ResolveError;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Metadata as yt-dlp reports it. Every field is optional here; `Track`
/// construction decides which ones are required.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    pub webpage_url: Option<String>,
    pub original_url: Option<String>,
}

impl TrackMetadata {
    pub fn page_url(&self) -> Option<&str> {
        self.webpage_url
            .as_deref()
            .or(self.original_url.as_deref())
    }

    /// Single-video extraction fills `thumbnail`; flat playlist entries
    /// only carry the `thumbnails` list, largest last.
    pub fn best_thumbnail(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or_else(|| self.thumbnails.last().map(|t| t.url.as_str()))
    }

    pub fn uploader_name(&self) -> Option<&str> {
        self.uploader.as_deref().or(self.channel.as_deref())
    }
}

#[derive(Clone, Debug)]
pub struct PlaylistInfo {
    pub title: String,
    pub uploader: String,
    pub count: usize,
    pub entries: Vec<(String, TrackMetadata)>,
}

/// A short-lived audio URL. Never cached: these expire.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StreamEndpoint {
    pub url: String,
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    Video,
    Playlist,
    Search,
}

pub fn classify_query(input: &str) -> QueryKind {
    let input = input.trim();
    let is_url = input.starts_with("http://") || input.starts_with("https://");
    if !is_url {
        QueryKind::Search
    } else if input.contains("/playlist") {
        QueryKind::Playlist
    } else {
        QueryKind::Video
    }
}

/// URL of the single track `query` refers to. Anything that isn't a
/// single-video link (keywords, playlist links) is searched for.
pub async fn single_track_url(
    resolver: &dyn TrackResolver,
    query: &str,
) -> Result<String, ResolveError> {
    let query = query.trim();
    match classify_query(query) {
        QueryKind::Video => Ok(query.to_string()),
        QueryKind::Playlist | QueryKind::Search => resolver
            .search(query)
            .await?
            .ok_or(ResolveError::NoResults),
    }
}

#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<TrackMetadata, ResolveError>;

    async fn resolve_playlist(&self, url: &str) -> Result<PlaylistInfo, ResolveError>;

    /// Returns the URL of the best match, if any.
    async fn search(&self, query: &str) -> Result<Option<String>, ResolveError>;

    async fn stream(&self, url: &str) -> Result<StreamEndpoint, ResolveError>;
}

#[derive(Deserialize)]
struct FlatEntry {
    url: Option<String>,
    #[serde(flatten)]
    metadata: TrackMetadata,
}

#[derive(Deserialize)]
struct FlatPlaylist {
    title: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    playlist_count: Option<usize>,
    #[serde(default)]
    entries: Vec<FlatEntry>,
}

/// Resolver backed by the `yt-dlp` binary.
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<u8>, ResolveError> {
        debug!("yt-dlp {}", args.join(" "));
        let output = Command::new(&self.program)
            .args([
                "--no-warnings",
                "--quiet",
                "--no-check-certificates",
                "--match-filter",
                "original_url!*=/shorts/",
            ])
            .args(args)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(stderr.trim()));
        }
        Ok(output.stdout)
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl TrackResolver for YtDlp {
    async fn resolve(&self, url: &str) -> Result<TrackMetadata, ResolveError> {
        let stdout = self
            .run(&["-j", "-f", "bestaudio/best", "--no-playlist", url])
            .await?;
        if stdout.iter().all(u8::is_ascii_whitespace) {
            // The shorts filter skips silently.
            return Err(ResolveError::Unsupported(url.to_string()));
        }
        Ok(serde_json::from_slice(&stdout)?)
    }

    async fn resolve_playlist(&self, url: &str) -> Result<PlaylistInfo, ResolveError> {
        let stdout = self.run(&["-J", "--flat-playlist", url]).await?;
        let playlist: FlatPlaylist = serde_json::from_slice(&stdout)?;

        let entries: Vec<(String, TrackMetadata)> = playlist
            .entries
            .into_iter()
            .filter_map(|entry| {
                let url = entry
                    .metadata
                    .page_url()
                    .map(str::to_string)
                    .or(entry.url)?;
                Some((url, entry.metadata))
            })
            .collect();

        Ok(PlaylistInfo {
            title: playlist.title.ok_or(ResolveError::MissingField("title"))?,
            uploader: playlist
                .uploader
                .or(playlist.channel)
                .unwrap_or_else(|| "Unknown".to_string()),
            count: playlist.playlist_count.unwrap_or(entries.len()),
            entries,
        })
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ResolveError> {
        let search = format!("ytsearch1:{query}");
        let stdout = self.run(&["-J", "--flat-playlist", &search]).await?;
        let results: FlatPlaylist = serde_json::from_slice(&stdout)?;

        Ok(results.entries.into_iter().next().and_then(|entry| {
            entry
                .metadata
                .page_url()
                .map(str::to_string)
                .or(entry.url)
        }))
    }

    async fn stream(&self, url: &str) -> Result<StreamEndpoint, ResolveError> {
        let stdout = self
            .run(&["-j", "-f", "bestaudio/best", "--no-playlist", url])
            .await?;
        Ok(serde_json::from_slice(&stdout)?)
    }
}

fn classify_failure(stderr: &str) -> ResolveError {
    const BLOCKED: [&str; 6] = [
        "confirm your age",
        "age-restricted",
        "copyright",
        "Private video",
        "Video unavailable",
        "blocked",
    ];

    if stderr.contains("Unsupported URL") {
        ResolveError::Unsupported(stderr.to_string())
    } else if BLOCKED.iter().any(|needle| stderr.contains(needle)) {
        ResolveError::Blocked(stderr.to_string())
    } else {
        ResolveError::Failed(stderr.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_query() {
        assert_eq!(
            classify_query("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            QueryKind::Video
        );
        assert_eq!(
            classify_query("https://www.youtube.com/playlist?list=PL123"),
            QueryKind::Playlist
        );
        assert_eq!(classify_query("never gonna give you up"), QueryKind::Search);
        assert_eq!(classify_query("  http://youtu.be/abc "), QueryKind::Video);
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure("ERROR: [youtube] abc: Sign in to confirm your age"),
            ResolveError::Blocked(_)
        ));
        assert!(matches!(
            classify_failure("ERROR: Unsupported URL: https://example.com"),
            ResolveError::Unsupported(_)
        ));
        assert!(matches!(
            classify_failure("ERROR: something else"),
            ResolveError::Failed(_)
        ));
    }

    #[test]
    fn test_metadata_from_single_video_json() {
        let json = r#"{
            "title": "Never Gonna Give You Up",
            "duration": 212.0,
            "uploader": "Rick Astley",
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
            "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "url": "https://rr1---sn.googlevideo.com/videoplayback"
        }"#;
        let meta: TrackMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(
            meta.page_url(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
        assert!(meta.best_thumbnail().unwrap().ends_with("maxresdefault.jpg"));
    }

    #[test]
    fn test_flat_entry_falls_back_to_thumbnails_and_channel() {
        let json = r#"{
            "url": "https://www.youtube.com/watch?v=abc",
            "title": "Entry",
            "duration": 90,
            "channel": "Some Channel",
            "thumbnails": [{"url": "https://i.ytimg.com/small.jpg"}, {"url": "https://i.ytimg.com/big.jpg"}]
        }"#;
        let entry: FlatEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.url.as_deref(), Some("https://www.youtube.com/watch?v=abc"));
        assert_eq!(entry.metadata.uploader_name(), Some("Some Channel"));
        assert_eq!(
            entry.metadata.best_thumbnail(),
            Some("https://i.ytimg.com/big.jpg")
        );
    }

    #[test]
    fn test_stream_endpoint_headers() {
        let json = r#"{"url": "https://cdn/audio", "http_headers": {"User-Agent": "x"}}"#;
        let stream: StreamEndpoint = serde_json::from_str(json).unwrap();
        assert_eq!(stream.url, "https://cdn/audio");
        assert_eq!(stream.http_headers.get("User-Agent").map(String::as_str), Some("x"));
    }
}
