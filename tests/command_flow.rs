mod common;

use common::{user, voice_channel, Harness};
use jack_music_bot::music::error::ResolveError;
use jack_music_bot::music::session::PlayNext;
use jack_music_bot::music::source::{self, TrackResolver};
use jack_music_bot::music::{MusicError, Requester, Track};

fn titles(tracks: &std::collections::VecDeque<Track>) -> Vec<String> {
    tracks.iter().map(|t| t.title().to_string()).collect()
}

fn alice() -> Requester {
    Requester::new(user(1), "alice")
}

/// What `/play` does once the user is known to be in `voice_channel(1)`.
async fn play(h: &Harness, query: &str) -> Result<Option<PlayNext>, MusicError> {
    let track = Track::from_query(h.resolver.as_ref(), alice(), query).await?;

    let shared = h.session().await;
    let mut session = shared.lock().await;
    session.ensure_joined(Some(voice_channel(1))).await?;
    session.add_track(track)?;
    if session.current().is_none() {
        Ok(Some(session.play_next(false).await))
    } else {
        Ok(None)
    }
}

#[tokio::test]
async fn test_play_queue_skip_flow() {
    let h = Harness::new();

    let first = play(&h, "https://www.youtube.com/watch?v=one").await.unwrap();
    assert!(matches!(first, Some(PlayNext::Started(ref t)) if t.title() == "Track one"));
    assert!(play(&h, "https://www.youtube.com/watch?v=two").await.unwrap().is_none());
    assert!(play(&h, "never gonna").await.unwrap().is_none());

    let shared = h.session().await;
    let mut session = shared.lock().await;
    let page = session.page(0).unwrap();
    assert_eq!(page.current.as_ref().map(|t| t.title()), Some("Track one"));
    let queued: Vec<_> = page.tracks.iter().map(|t| t.title().to_string()).collect();
    assert_eq!(queued, ["Track two", "Track never_gonna"]);

    let (skipped, next) = session.skip().await.unwrap();
    assert_eq!(skipped.title(), "Track one");
    assert!(matches!(next, PlayNext::Started(ref t) if t.title() == "Track two"));
    assert_eq!(session.current().unwrap().adder().name, "alice");
}

#[tokio::test]
async fn test_play_keyword_and_playlist_links_are_searched() {
    let h = Harness::new();
    source::single_track_url(h.resolver.as_ref(), "lofi beats")
        .await
        .unwrap();
    source::single_track_url(
        h.resolver.as_ref(),
        "https://www.youtube.com/playlist?list=PL123",
    )
    .await
    .unwrap();

    let searches = h.resolver.searches.lock().unwrap().clone();
    assert_eq!(
        searches,
        ["lofi beats", "https://www.youtube.com/playlist?list=PL123"]
    );
}

#[tokio::test]
async fn test_play_search_without_results() {
    let h = Harness::new();
    let err = play(&h, "nothing").await.unwrap_err();
    assert!(matches!(err, MusicError::Resolution(ResolveError::NoResults)));
    assert!(!h.session().await.lock().await.is_connected());
}

#[tokio::test]
async fn test_play_blocked_link_adds_nothing() {
    let h = Harness::new();
    let err = play(&h, "https://www.youtube.com/watch?v=blocked").await.unwrap_err();
    assert!(matches!(err, MusicError::Resolution(ResolveError::Blocked(_))));
    assert_eq!(
        err.to_string(),
        "Link blocked! Is the video age-restricted or copyright claimed?"
    );

    let shared = h.session().await;
    let session = shared.lock().await;
    assert!(session.queue().is_empty());
    assert!(session.current().is_none());
}

#[tokio::test]
async fn test_playlist_entries_missing_metadata_are_counted() {
    let h = Harness::new();
    let playlist = h
        .resolver
        .resolve_playlist("https://www.youtube.com/playlist?list=PL123")
        .await
        .unwrap();

    let shared = h.connected(&[1]).await;
    let mut session = shared.lock().await;
    assert_eq!(session.add_playlist(&alice(), &playlist).unwrap(), (2, 1));
    assert_eq!(titles(session.queue()), ["Track p1", "Track p2"]);
}

#[tokio::test]
async fn test_playlist_is_not_queued_after_losing_voice() {
    let h = Harness::new();
    let shared = h.connected(&[1]).await;
    let playlist = h
        .resolver
        .resolve_playlist("https://www.youtube.com/playlist?list=PL123")
        .await
        .unwrap();

    // Kicked from voice while the playlist was loading.
    assert!(shared.lock().await.handle_external_disconnect().await);

    let mut session = shared.lock().await;
    assert!(matches!(
        session.add_playlist(&alice(), &playlist),
        Err(MusicError::BotNotInVoiceChannel)
    ));
    assert!(session.queue().is_empty());
    assert!(!session.has_idle_timer());

    session.ensure_joined(Some(voice_channel(1))).await.unwrap();
    assert_eq!(session.add_playlist(&alice(), &playlist).unwrap(), (2, 1));
}

#[tokio::test]
async fn test_unsupported_link_falls_back_to_search() {
    let h = Harness::new();
    let started = play(&h, "https://example.com/unsupported").await.unwrap();
    assert!(matches!(started, Some(PlayNext::Started(ref t)) if t.title() == "Track fallback"));

    let searches = h.resolver.searches.lock().unwrap().clone();
    assert_eq!(searches, ["https://example.com/unsupported"]);
}

#[tokio::test]
async fn test_blocked_link_is_not_searched() {
    let h = Harness::new();
    play(&h, "https://www.youtube.com/watch?v=blocked").await.unwrap_err();
    assert!(h.resolver.searches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_same_link_twice_gives_distinct_entries() {
    let h = Harness::new();
    play(&h, "https://www.youtube.com/watch?v=dup").await.unwrap();
    play(&h, "https://www.youtube.com/watch?v=dup").await.unwrap();

    let shared = h.session().await;
    let session = shared.lock().await;
    let current = session.current().unwrap();
    let queued = &session.queue()[0];
    assert_eq!(current.url(), queued.url());
    assert_ne!(current.entry_id(), queued.entry_id());
}

#[tokio::test]
async fn test_play_from_another_channel_is_rejected() {
    let h = Harness::new();
    play(&h, "https://www.youtube.com/watch?v=one").await.unwrap();

    let shared = h.session().await;
    let mut session = shared.lock().await;
    assert!(matches!(
        session.ensure_joined(Some(voice_channel(2))).await,
        Err(MusicError::WrongChannel { .. })
    ));
    assert!(matches!(
        session.check_same_channel(Some(voice_channel(2))).await,
        Err(MusicError::WrongChannel { .. })
    ));
    assert_eq!(
        session.check_same_channel(Some(voice_channel(1))).await.unwrap(),
        voice_channel(1)
    );
}
