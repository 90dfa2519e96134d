use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serenity::cache::Cache;
use serenity::model::id::{ChannelId, GuildId, UserId};
use songbird::error::JoinError;
use songbird::events::{Event, EventContext, EventHandler, TrackEvent};
use songbird::input::HttpRequest;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Songbird};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::VoiceError;
use super::source::StreamEndpoint;
use super::voice::{TrackEndSignal, VoiceGateway, VoiceSession};

struct TrackEndNotifier {
    signal: TrackEndSignal,
}

#[async_trait]
impl EventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        debug!("track ended (generation {})", self.signal.generation());
        self.signal.fire();
        None
    }
}

fn join_error(e: JoinError) -> VoiceError {
    match e {
        JoinError::Dropped | JoinError::TimedOut => VoiceError::Cooldown,
        other => VoiceError::Gateway(other.to_string()),
    }
}

fn header_map(headers: &HashMap<String, String>) -> HeaderMap {
    headers
        .iter()
        .filter_map(|(name, value)| {
            Some((
                HeaderName::from_bytes(name.as_bytes()).ok()?,
                HeaderValue::from_str(value).ok()?,
            ))
        })
        .collect()
}

/// Connects guild sessions through songbird.
pub struct SongbirdGateway {
    manager: Arc<Songbird>,
    cache: Arc<Cache>,
    http_client: reqwest::Client,
}

impl SongbirdGateway {
    pub fn new(manager: Arc<Songbird>, cache: Arc<Cache>, http_client: reqwest::Client) -> Self {
        Self {
            manager,
            cache,
            http_client,
        }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<dyn VoiceSession>, VoiceError> {
        let call = self
            .manager
            .join(guild_id, channel_id)
            .await
            .map_err(join_error)?;

        {
            let mut handler = call.lock().await;
            if let Err(e) = handler.deafen(true).await {
                warn!("self-deafen failed (guild: {guild_id}): {e}");
            }
        }

        Ok(Arc::new(SongbirdVoice {
            guild_id,
            call,
            manager: Arc::clone(&self.manager),
            cache: Arc::clone(&self.cache),
            http_client: self.http_client.clone(),
            track: Mutex::new(None),
        }))
    }
}

pub struct SongbirdVoice {
    guild_id: GuildId,
    call: Arc<Mutex<Call>>,
    manager: Arc<Songbird>,
    cache: Arc<Cache>,
    http_client: reqwest::Client,
    track: Mutex<Option<TrackHandle>>,
}

impl SongbirdVoice {
    async fn play_mode(&self) -> Option<PlayMode> {
        let handle = self.track.lock().await.clone()?;
        handle.get_info().await.ok().map(|info| info.playing)
    }

    async fn handle(&self) -> Result<TrackHandle, VoiceError> {
        self.track
            .lock()
            .await
            .clone()
            .ok_or_else(|| VoiceError::Playback("no track loaded".to_string()))
    }
}

#[async_trait]
impl VoiceSession for SongbirdVoice {
    async fn current_channel(&self) -> Option<ChannelId> {
        let handler = self.call.lock().await;
        handler
            .current_channel()
            .map(|ch| ChannelId::new(ch.0.get()))
    }

    async fn move_to(&self, channel_id: ChannelId) -> Result<(), VoiceError> {
        self.manager
            .join(self.guild_id, channel_id)
            .await
            .map(|_| ())
            .map_err(join_error)
    }

    async fn disconnect(&self) -> Result<(), VoiceError> {
        match self.manager.remove(self.guild_id).await {
            Ok(()) | Err(JoinError::NoCall) => Ok(()),
            Err(e) => Err(join_error(e)),
        }
    }

    async fn play(&self, stream: StreamEndpoint, on_end: TrackEndSignal) -> Result<(), VoiceError> {
        let headers = header_map(&stream.http_headers);
        let src = HttpRequest::new_with_headers(self.http_client.clone(), stream.url, headers);

        let track_handle = {
            let mut handler = self.call.lock().await;
            handler.play_only_input(src.into())
        }; // handler lock dropped here

        for event in [TrackEvent::End, TrackEvent::Error] {
            track_handle
                .add_event(
                    Event::Track(event),
                    TrackEndNotifier {
                        signal: on_end.clone(),
                    },
                )
                .map_err(|e| VoiceError::Playback(e.to_string()))?;
        }

        *self.track.lock().await = Some(track_handle);
        Ok(())
    }

    async fn stop(&self) {
        self.call.lock().await.stop();
        *self.track.lock().await = None;
    }

    async fn pause(&self) -> Result<(), VoiceError> {
        self.handle()
            .await?
            .pause()
            .map_err(|e| VoiceError::Playback(e.to_string()))
    }

    async fn resume(&self) -> Result<(), VoiceError> {
        self.handle()
            .await?
            .play()
            .map_err(|e| VoiceError::Playback(e.to_string()))
    }

    async fn is_playing(&self) -> bool {
        self.play_mode().await == Some(PlayMode::Play)
    }

    async fn is_paused(&self) -> bool {
        self.play_mode().await == Some(PlayMode::Pause)
    }

    async fn channel_members(&self) -> HashSet<UserId> {
        let Some(channel) = self.current_channel().await else {
            return HashSet::new();
        };
        match self.cache.guild(self.guild_id) {
            Some(guild) => guild
                .voice_states
                .values()
                .filter(|vs| vs.channel_id == Some(channel))
                .map(|vs| vs.user_id)
                .collect(),
            None => HashSet::new(),
        }
    }
}
