#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jack_music_bot::config::Settings;
use jack_music_bot::music::error::ResolveError;
use jack_music_bot::music::registry::SharedSession;
use jack_music_bot::music::source::{PlaylistInfo, StreamEndpoint, TrackMetadata, TrackResolver};
use jack_music_bot::music::voice::{TrackEndSignal, VoiceGateway, VoiceSession};
use jack_music_bot::music::{
    Notice, Notifier, Requester, Services, SessionEvent, SessionRegistry, Track, VoiceError,
};
use serenity::model::id::{ChannelId, GuildId, UserId};
use tokio::sync::mpsc::UnboundedReceiver;

pub const GUILD: GuildId = GuildId::new(1);
pub const BOT: UserId = UserId::new(999);
pub const TEXT: ChannelId = ChannelId::new(500);

pub fn voice_channel(n: u64) -> ChannelId {
    ChannelId::new(100 + n)
}

pub fn user(n: u64) -> UserId {
    UserId::new(n)
}

pub fn url(name: &str) -> String {
    format!("https://www.youtube.com/watch?v={name}")
}

pub fn metadata(name: &str) -> TrackMetadata {
    TrackMetadata {
        title: Some(format!("Track {name}")),
        duration: Some(100.0),
        uploader: Some("Uploader".into()),
        thumbnail: Some(format!("https://i.ytimg.com/{name}.jpg")),
        ..Default::default()
    }
}

pub fn track(name: &str) -> Track {
    Track::from_metadata(Requester::new(user(1), "alice"), &url(name), &metadata(name))
        .expect("mock metadata is complete")
}

#[derive(Default)]
struct VoiceState {
    channel: Option<ChannelId>,
    playing: Option<String>,
    paused: bool,
    signal: Option<TrackEndSignal>,
    plays: Vec<String>,
    members: HashSet<UserId>,
    disconnected: bool,
}

/// In-memory voice connection. Tracks never end on their own; tests call
/// `finish_track` to simulate the end of playback.
#[derive(Default)]
pub struct MockVoice {
    state: Mutex<VoiceState>,
}

impl MockVoice {
    pub fn set_members(&self, members: impl IntoIterator<Item = UserId>) {
        self.state.lock().unwrap().members = members.into_iter().collect();
    }

    /// Urls handed to `play`, in order.
    pub fn plays(&self) -> Vec<String> {
        self.state.lock().unwrap().plays.clone()
    }

    pub fn playing(&self) -> Option<String> {
        self.state.lock().unwrap().playing.clone()
    }

    pub fn was_disconnected(&self) -> bool {
        self.state.lock().unwrap().disconnected
    }

    pub fn last_signal(&self) -> Option<TrackEndSignal> {
        self.state.lock().unwrap().signal.clone()
    }

    pub fn finish_track(&self) {
        let signal = {
            let mut state = self.state.lock().unwrap();
            state.playing = None;
            state.paused = false;
            state.signal.take()
        };
        if let Some(signal) = signal {
            signal.fire();
        }
    }
}

#[async_trait]
impl VoiceSession for MockVoice {
    async fn current_channel(&self) -> Option<ChannelId> {
        self.state.lock().unwrap().channel
    }

    async fn move_to(&self, channel_id: ChannelId) -> Result<(), VoiceError> {
        self.state.lock().unwrap().channel = Some(channel_id);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), VoiceError> {
        let mut state = self.state.lock().unwrap();
        state.channel = None;
        state.disconnected = true;
        Ok(())
    }

    async fn play(&self, stream: StreamEndpoint, on_end: TrackEndSignal) -> Result<(), VoiceError> {
        let mut state = self.state.lock().unwrap();
        state.plays.push(stream.url.clone());
        state.playing = Some(stream.url);
        state.paused = false;
        state.signal = Some(on_end);
        Ok(())
    }

    async fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        state.playing = None;
        state.paused = false;
    }

    async fn pause(&self) -> Result<(), VoiceError> {
        self.state.lock().unwrap().paused = true;
        Ok(())
    }

    async fn resume(&self) -> Result<(), VoiceError> {
        self.state.lock().unwrap().paused = false;
        Ok(())
    }

    async fn is_playing(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.playing.is_some() && !state.paused
    }

    async fn is_paused(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.playing.is_some() && state.paused
    }

    async fn channel_members(&self) -> HashSet<UserId> {
        self.state.lock().unwrap().members.clone()
    }
}

#[derive(Default)]
pub struct MockGateway {
    pub voice: Arc<MockVoice>,
    pub cooldown: AtomicBool,
    pub connects: AtomicUsize,
}

#[async_trait]
impl VoiceGateway for MockGateway {
    async fn connect(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<dyn VoiceSession>, VoiceError> {
        if self.cooldown.load(Ordering::SeqCst) {
            return Err(VoiceError::Cooldown);
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.voice.move_to(channel_id).await?;
        Ok(self.voice.clone())
    }
}

/// Urls containing `blocked` fail metadata lookup; urls containing `dead`
/// resolve but have no stream. Urls containing `unsupported` match no
/// extractor and searching for them finds `fallback`.
#[derive(Default)]
pub struct MockResolver {
    pub searches: Mutex<Vec<String>>,
}

#[async_trait]
impl TrackResolver for MockResolver {
    async fn resolve(&self, url: &str) -> Result<TrackMetadata, ResolveError> {
        if url.contains("blocked") {
            return Err(ResolveError::Blocked("Sign in to confirm your age".into()));
        }
        if url.contains("unsupported") {
            return Err(ResolveError::Unsupported(url.to_string()));
        }
        let name = url.rsplit('=').next().unwrap_or(url);
        Ok(metadata(name))
    }

    async fn resolve_playlist(&self, playlist_url: &str) -> Result<PlaylistInfo, ResolveError> {
        let mut broken = metadata("broken");
        broken.duration = None;
        Ok(PlaylistInfo {
            title: format!("Playlist {playlist_url}"),
            uploader: "Uploader".into(),
            count: 3,
            entries: vec![
                (url("p1"), metadata("p1")),
                (url("broken"), broken),
                (url("p2"), metadata("p2")),
            ],
        })
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ResolveError> {
        self.searches.lock().unwrap().push(query.to_string());
        if query == "nothing" {
            return Ok(None);
        }
        if query.contains("unsupported") {
            return Ok(Some(url("fallback")));
        }
        Ok(Some(url(&query.replace(' ', "_"))))
    }

    async fn stream(&self, url: &str) -> Result<StreamEndpoint, ResolveError> {
        if url.contains("dead") {
            return Err(ResolveError::Failed("HTTP Error 403: Forbidden".into()));
        }
        Ok(StreamEndpoint {
            url: url.to_string(),
            http_headers: Default::default(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(ChannelId, Notice)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|(_, notice)| notice.clone())
            .collect()
    }

    pub fn channels(&self) -> Vec<ChannelId> {
        self.notices.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, channel: ChannelId, notice: Notice) {
        self.notices.lock().unwrap().push((channel, notice));
    }
}

pub struct Harness {
    pub registry: SessionRegistry,
    pub events: UnboundedReceiver<SessionEvent>,
    pub gateway: Arc<MockGateway>,
    pub voice: Arc<MockVoice>,
    pub resolver: Arc<MockResolver>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let gateway = Arc::new(MockGateway::default());
        let voice = gateway.voice.clone();
        let resolver = Arc::new(MockResolver::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let services = Services {
            resolver: resolver.clone(),
            gateway: gateway.clone(),
            notifier: notifier.clone(),
            settings,
        };
        let (registry, events) = SessionRegistry::new(services);
        Self {
            registry,
            events,
            gateway,
            voice,
            resolver,
            notifier,
        }
    }

    /// The guild's session, announcing into `TEXT`.
    pub async fn session(&self) -> SharedSession {
        let shared = self.registry.get_or_register(GUILD).await;
        shared.lock().await.set_announce_channel(TEXT);
        shared
    }

    /// A session already connected to voice channel 1 with the bot and
    /// `users` as members.
    pub async fn connected(&self, users: &[u64]) -> SharedSession {
        let shared = self.session().await;
        shared
            .lock()
            .await
            .ensure_joined(Some(voice_channel(1)))
            .await
            .expect("mock gateway connects");
        self.voice
            .set_members(std::iter::once(BOT).chain(users.iter().map(|n| user(*n))));
        shared
    }

    /// Waits for the next session event and runs it through the registry.
    pub async fn deliver_next(&mut self) -> SessionEvent {
        let event = self.events.recv().await.expect("registry holds a sender");
        self.registry.dispatch(event.clone()).await;
        event
    }
}
