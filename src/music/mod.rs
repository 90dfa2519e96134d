pub mod error;
pub mod player;
pub mod registry;
pub mod session;
pub mod source;
pub mod voice;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, UserId};

use crate::config::Settings;
use error::ResolveError;
use source::{TrackMetadata, TrackResolver};
use voice::VoiceGateway;

pub use error::{MusicError, VoiceError};
pub use registry::{SessionEvent, SessionRegistry};
pub use session::GuildSession;

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// The user who queued a track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requester {
    pub id: UserId,
    pub name: String,
}

impl Requester {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A resolved track. Fields are fixed at construction; clones share the
/// entry id, which is how a queue copy of the current track is recognised.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    entry_id: u64,
    adder: Requester,
    url: String,
    title: String,
    duration: u64,
    uploader: String,
    thumbnail: String,
}

impl Track {
    /// Builds a track from already-extracted metadata (playlist entries take
    /// this path). Fails without side effects if a required field is absent.
    pub fn from_metadata(
        adder: Requester,
        url: &str,
        metadata: &TrackMetadata,
    ) -> Result<Self, ResolveError> {
        let title = metadata
            .title
            .clone()
            .ok_or(ResolveError::MissingField("title"))?;
        let duration = metadata
            .duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or(ResolveError::MissingField("duration"))?;
        let uploader = metadata
            .uploader_name()
            .ok_or(ResolveError::MissingField("uploader"))?
            .to_string();
        let thumbnail = metadata
            .best_thumbnail()
            .ok_or(ResolveError::MissingField("thumbnail"))?
            .to_string();

        Ok(Self {
            entry_id: NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed),
            adder,
            url: url.to_string(),
            title,
            duration: duration as u64,
            uploader,
            thumbnail,
        })
    }

    /// Extracts metadata for `url` and builds a track from it.
    pub async fn resolve(
        resolver: &dyn TrackResolver,
        adder: Requester,
        url: &str,
    ) -> Result<Self, ResolveError> {
        let metadata = resolver.resolve(url).await?;
        Self::from_metadata(adder, url, &metadata)
    }

    /// Resolves what a user typed into `/play`. A link no extractor
    /// supports is retried as a keyword search.
    pub async fn from_query(
        resolver: &dyn TrackResolver,
        adder: Requester,
        query: &str,
    ) -> Result<Self, ResolveError> {
        let url = source::single_track_url(resolver, query).await?;
        match Self::resolve(resolver, adder.clone(), &url).await {
            Err(ResolveError::Unsupported(_))
                if source::classify_query(query) == source::QueryKind::Video =>
            {
                let url = resolver
                    .search(query.trim())
                    .await?
                    .ok_or(ResolveError::NoResults)?;
                Self::resolve(resolver, adder, &url).await
            }
            resolved => resolved,
        }
    }

    pub fn entry_id(&self) -> u64 {
        self.entry_id
    }

    pub fn adder(&self) -> &Requester {
        &self.adder
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Length in whole seconds.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn uploader(&self) -> &str {
        &self.uploader
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    #[default]
    Off,
    Queue,
    Track,
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Queue => write!(f, "queue"),
            Self::Track => write!(f, "track"),
        }
    }
}

impl std::str::FromStr for LoopMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "queue" | "all" => Ok(Self::Queue),
            "track" | "song" | "one" => Ok(Self::Track),
            other => Err(format!("unknown loop mode `{other}`")),
        }
    }
}

/// Things a session reports on its own, outside of any command reply.
#[derive(Clone, Debug)]
pub enum Notice {
    NowPlaying { track: Track, loop_mode: LoopMode },
    QueueEnded,
    IdleDisconnect,
    PlaybackFailed { track: Track, reason: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel: ChannelId, notice: Notice);
}

/// Collaborators shared by every session.
pub struct Services {
    pub resolver: Arc<dyn TrackResolver>,
    pub gateway: Arc<dyn VoiceGateway>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: Settings,
}
