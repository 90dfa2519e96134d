use std::collections::HashMap;
use std::sync::Arc;

use serenity::model::id::GuildId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::session::GuildSession;
use super::Services;

/// Messages that drive sessions from outside a command: voice-layer
/// callbacks and idle timers post these instead of touching state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    TrackEnded { guild_id: GuildId, generation: u64 },
    IdleTimeout { guild_id: GuildId, timer: u64 },
}

impl SessionEvent {
    pub fn guild_id(&self) -> GuildId {
        match self {
            Self::TrackEnded { guild_id, .. } | Self::IdleTimeout { guild_id, .. } => *guild_id,
        }
    }
}

pub type SharedSession = Arc<Mutex<GuildSession>>;

/// Guild id to session map. Sessions are only ever added.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<GuildId, SharedSession>>>,
    services: Arc<Services>,
    events: UnboundedSender<SessionEvent>,
}

impl SessionRegistry {
    pub fn new(services: Services) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let registry = Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            services: Arc::new(services),
            events,
        };
        (registry, receiver)
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Creates a session for `guild_id` unless one exists. Returns whether
    /// a new session was created.
    pub async fn register(&self, guild_id: GuildId) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&guild_id) {
            return false;
        }
        sessions.insert(guild_id, self.new_session(guild_id));
        info!("session registered (guild: {guild_id})");
        true
    }

    pub async fn get(&self, guild_id: GuildId) -> Option<SharedSession> {
        self.sessions.read().await.get(&guild_id).cloned()
    }

    /// Commands can race the ready event, so they go through this.
    pub async fn get_or_register(&self, guild_id: GuildId) -> SharedSession {
        if let Some(session) = self.get(guild_id).await {
            return session;
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(guild_id)
            .or_insert_with(|| self.new_session(guild_id))
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn new_session(&self, guild_id: GuildId) -> SharedSession {
        Arc::new(Mutex::new(GuildSession::new(
            guild_id,
            Arc::clone(&self.services),
            self.events.clone(),
        )))
    }

    pub async fn dispatch(&self, event: SessionEvent) {
        let Some(session) = self.get(event.guild_id()).await else {
            debug!("event for unknown guild: {event:?}");
            return;
        };
        let mut session = session.lock().await;
        match event {
            SessionEvent::TrackEnded { generation, .. } => {
                session.on_track_end(generation).await;
            }
            SessionEvent::IdleTimeout { timer, .. } => {
                session.on_idle_timeout(timer).await;
            }
        }
    }

    /// Drains session events for the life of the process. Each event gets its
    /// own task so a slow stream lookup in one guild doesn't hold up others;
    /// the session lock keeps events for the same guild serialised.
    pub async fn run(self, mut receiver: UnboundedReceiver<SessionEvent>) {
        while let Some(event) = receiver.recv().await {
            let registry = self.clone();
            tokio::spawn(async move {
                registry.dispatch(event).await;
            });
        }
    }
}
