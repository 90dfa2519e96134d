use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use tokio::sync::mpsc::UnboundedSender;

use super::error::VoiceError;
use super::registry::SessionEvent;
use super::source::StreamEndpoint;

/// Result of asking the bot to be in a user's voice channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(ChannelId),
    Moved(ChannelId),
    AlreadyThere(ChannelId),
    UserNotInChannel,
    ReconnectCooldown,
}

/// Handed to the voice layer with every track. Firing it only posts a
/// message; the session itself is advanced from the registry's event loop.
#[derive(Clone, Debug)]
pub struct TrackEndSignal {
    guild_id: GuildId,
    generation: u64,
    events: UnboundedSender<SessionEvent>,
}

impl TrackEndSignal {
    pub(crate) fn new(
        guild_id: GuildId,
        generation: u64,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            guild_id,
            generation,
            events,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fire(&self) {
        let _ = self.events.send(SessionEvent::TrackEnded {
            guild_id: self.guild_id,
            generation: self.generation,
        });
    }
}

/// An active voice connection in one guild.
#[async_trait]
pub trait VoiceSession: Send + Sync {
    async fn current_channel(&self) -> Option<ChannelId>;

    async fn move_to(&self, channel_id: ChannelId) -> Result<(), VoiceError>;

    async fn disconnect(&self) -> Result<(), VoiceError>;

    /// Starts `stream`, replacing anything already playing. `on_end` fires
    /// once when the track finishes or is stopped.
    async fn play(&self, stream: StreamEndpoint, on_end: TrackEndSignal) -> Result<(), VoiceError>;

    async fn stop(&self);

    async fn pause(&self) -> Result<(), VoiceError>;

    async fn resume(&self) -> Result<(), VoiceError>;

    async fn is_playing(&self) -> bool;

    async fn is_paused(&self) -> bool;

    /// Everyone in the connected channel, the bot included.
    async fn channel_members(&self) -> HashSet<UserId>;
}

#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<dyn VoiceSession>, VoiceError>;
}
