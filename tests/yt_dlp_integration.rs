use jack_music_bot::music::error::ResolveError;
use jack_music_bot::music::source::{self, TrackResolver, YtDlp};
use jack_music_bot::music::{Requester, Track};
use serenity::model::id::UserId;

const STABLE_VIDEO: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

#[tokio::test]
#[ignore] // Requires yt-dlp installed and network access
async fn test_resolve_video_url() {
    let ytdlp = YtDlp::default();
    let track = Track::resolve(&ytdlp, Requester::new(UserId::new(1), "alice"), STABLE_VIDEO).await;
    assert!(track.is_ok(), "resolve failed: {:?}", track.err());
    let track = track.unwrap();
    assert!(!track.title().is_empty());
    assert!(track.duration() > 0);
    assert!(track.thumbnail().starts_with("http"));
}

#[tokio::test]
#[ignore] // Requires yt-dlp installed and network access
async fn test_search_keyword() {
    let ytdlp = YtDlp::default();
    let url = source::single_track_url(&ytdlp, "never gonna give you up rick astley").await;
    assert!(url.is_ok(), "search failed: {:?}", url.err());
    assert!(url.unwrap().contains("youtube.com"));
}

#[tokio::test]
#[ignore] // Requires yt-dlp installed and network access
async fn test_stream_endpoint() {
    let stream = YtDlp::default().stream(STABLE_VIDEO).await;
    assert!(stream.is_ok(), "stream failed: {:?}", stream.err());
    assert!(stream.unwrap().url.starts_with("http"));
}

#[tokio::test]
#[ignore] // Requires yt-dlp installed and network access
async fn test_unsupported_url() {
    let result = YtDlp::default().resolve("https://example.com/not-a-video").await;
    assert!(matches!(
        result,
        Err(ResolveError::Unsupported(_) | ResolveError::Failed(_))
    ));
}

#[tokio::test]
async fn test_missing_binary_is_an_io_error() {
    let result = YtDlp::new("/nonexistent/yt-dlp").resolve(STABLE_VIDEO).await;
    assert!(matches!(result, Err(ResolveError::Io(_))));
}
