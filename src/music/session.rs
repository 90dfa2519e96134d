use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serenity::model::id::{ChannelId, GuildId, UserId};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::{MusicError, VoiceError};
use super::registry::SessionEvent;
use super::source::PlaylistInfo;
use super::voice::{JoinOutcome, TrackEndSignal, VoiceSession};
use super::{LoopMode, Notice, Requester, Services, Track};

/// What happened when the session tried to move on to the next track.
#[derive(Clone, Debug)]
pub enum PlayNext {
    Started(Track),
    /// Nothing left; the idle timer is now armed.
    QueueEnded,
    /// The session has no voice connection.
    Disconnected,
}

#[derive(Clone, Debug)]
pub enum VoteOutcome {
    Recorded {
        votes: usize,
        required: usize,
    },
    Skipped {
        votes: usize,
        required: usize,
        skipped: Track,
        next: PlayNext,
    },
}

#[derive(Clone, Debug)]
pub struct QueuePage {
    pub index: usize,
    pub last_index: usize,
    /// Zero-based queue position of the first track on this page.
    pub offset: usize,
    pub tracks: Vec<Track>,
    /// Only attached to page 0.
    pub current: Option<Track>,
    pub total_len: usize,
    pub total_duration: u64,
    pub loop_mode: LoopMode,
    pub shuffle: bool,
}

#[derive(Clone, Debug)]
pub struct NowPlaying {
    pub track: Track,
    pub elapsed: Duration,
    pub paused: bool,
    pub loop_mode: LoopMode,
    pub shuffle: bool,
}

struct IdleTimer {
    id: u64,
    handle: JoinHandle<()>,
}

/// Index of the last queue page. A queue that exactly fills its pages does
/// not get an extra empty one.
pub fn last_page_index(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    let last = len / page_size;
    if len > 0 && len % page_size == 0 {
        last - 1
    } else {
        last
    }
}

/// Votes needed to skip with `member_count` people (bot included) in the channel.
pub fn skip_quorum(member_count: usize) -> usize {
    member_count.saturating_sub(1).div_ceil(2)
}

/// One guild's queue and playback state.
///
/// Lives for the whole process; disconnecting resets the playback state
/// but keeps the session itself.
pub struct GuildSession {
    guild_id: GuildId,
    services: Arc<Services>,
    events: UnboundedSender<SessionEvent>,
    voice: Option<Arc<dyn VoiceSession>>,
    queue: VecDeque<Track>,
    current: Option<Track>,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    idle_timer: Option<IdleTimer>,
    idle_seq: u64,
    loop_mode: LoopMode,
    shuffle: bool,
    vote_skips: HashSet<UserId>,
    generation: u64,
    announce_channel: Option<ChannelId>,
}

impl GuildSession {
    pub fn new(
        guild_id: GuildId,
        services: Arc<Services>,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            guild_id,
            services,
            events,
            voice: None,
            queue: VecDeque::new(),
            current: None,
            started_at: None,
            paused_at: None,
            idle_timer: None,
            idle_seq: 0,
            loop_mode: LoopMode::Off,
            shuffle: false,
            vote_skips: HashSet::new(),
            generation: 0,
            announce_channel: None,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn is_connected(&self) -> bool {
        self.voice.is_some()
    }

    pub fn queue(&self) -> &VecDeque<Track> {
        &self.queue
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn vote_count(&self) -> usize {
        self.vote_skips.len()
    }

    pub fn has_idle_timer(&self) -> bool {
        self.idle_timer.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Text channel that receives notices for this guild.
    pub fn set_announce_channel(&mut self, channel_id: ChannelId) {
        self.announce_channel = Some(channel_id);
    }

    pub async fn voice_channel(&self) -> Option<ChannelId> {
        match &self.voice {
            Some(voice) => voice.current_channel().await,
            None => None,
        }
    }

    /// Playback time of the current track, paused intervals excluded.
    pub fn elapsed(&self) -> Duration {
        let Some(started) = self.started_at else {
            return Duration::ZERO;
        };
        let until = self.paused_at.unwrap_or_else(Instant::now);
        until.saturating_duration_since(started)
    }

    /// Errors unless the user sits in the bot's current channel.
    pub async fn check_same_channel(
        &self,
        user_channel: Option<ChannelId>,
    ) -> Result<ChannelId, MusicError> {
        let bot_channel = self
            .voice_channel()
            .await
            .ok_or(MusicError::BotNotInVoiceChannel)?;
        if user_channel == Some(bot_channel) {
            Ok(bot_channel)
        } else {
            Err(MusicError::WrongChannel { bot_channel })
        }
    }

    pub async fn join(
        &mut self,
        user_channel: Option<ChannelId>,
    ) -> Result<JoinOutcome, MusicError> {
        let Some(target) = user_channel else {
            return Ok(JoinOutcome::UserNotInChannel);
        };

        let result = match self.voice.clone() {
            Some(voice) => {
                if voice.current_channel().await == Some(target) {
                    return Ok(JoinOutcome::AlreadyThere(target));
                }
                voice.move_to(target).await.map(|()| JoinOutcome::Moved(target))
            }
            None => {
                let gateway = Arc::clone(&self.services.gateway);
                match gateway.connect(self.guild_id, target).await {
                    Ok(voice) => {
                        self.voice = Some(voice);
                        Ok(JoinOutcome::Joined(target))
                    }
                    Err(e) => Err(e),
                }
            }
        };

        match result {
            Ok(outcome) => {
                info!("voice {outcome:?} (guild: {})", self.guild_id);
                Ok(outcome)
            }
            Err(VoiceError::Cooldown) => Ok(JoinOutcome::ReconnectCooldown),
            Err(e) => Err(e.into()),
        }
    }

    /// Joins the user's channel unless the bot is already busy in another one.
    pub async fn ensure_joined(
        &mut self,
        user_channel: Option<ChannelId>,
    ) -> Result<ChannelId, MusicError> {
        let target = user_channel.ok_or(MusicError::NotInVoiceChannel)?;
        if let Some(bot_channel) = self.voice_channel().await {
            if bot_channel != target {
                return Err(MusicError::WrongChannel { bot_channel });
            }
        }

        match self.join(Some(target)).await? {
            JoinOutcome::Joined(c) | JoinOutcome::Moved(c) | JoinOutcome::AlreadyThere(c) => Ok(c),
            JoinOutcome::UserNotInChannel => Err(MusicError::NotInVoiceChannel),
            JoinOutcome::ReconnectCooldown => Err(MusicError::ReconnectCooldown),
        }
    }

    pub async fn leave(&mut self, user_channel: Option<ChannelId>) -> Result<ChannelId, MusicError> {
        let channel = self.check_same_channel(user_channel).await?;
        self.disconnect().await;
        Ok(channel)
    }

    /// Full leave: drop the connection and reset all playback state.
    pub async fn disconnect(&mut self) {
        if let Some(voice) = self.voice.take() {
            voice.stop().await;
            if let Err(e) = voice.disconnect().await {
                warn!("disconnect failed (guild: {}): {e}", self.guild_id);
            }
        }
        self.reset();
    }

    /// Called when the gateway reports the bot left voice without us asking.
    pub async fn handle_external_disconnect(&mut self) -> bool {
        if self.voice.is_none() {
            return false;
        }
        info!("externally disconnected, resetting (guild: {})", self.guild_id);
        self.disconnect().await;
        true
    }

    pub fn reset(&mut self) {
        self.cancel_idle_timer();
        self.voice = None;
        self.queue.clear();
        self.current = None;
        self.started_at = None;
        self.paused_at = None;
        self.loop_mode = LoopMode::Off;
        self.shuffle = false;
        self.vote_skips.clear();
        self.generation += 1;
    }

    /// Appends to the tail. Returns the new queue length.
    pub fn add_track(&mut self, track: Track) -> Result<usize, MusicError> {
        if let Some(limit) = self.services.settings.max_queue_len {
            if self.queue.len() >= limit {
                return Err(MusicError::QueueFull { limit });
            }
        }
        self.queue.push_back(track);
        Ok(self.queue.len())
    }

    /// Queues every usable playlist entry. Returns `(added, failed)`; entries
    /// missing metadata or over capacity count as failed.
    ///
    /// Refuses to queue into a session that has lost its voice connection.
    pub fn add_playlist(
        &mut self,
        requester: &Requester,
        playlist: &PlaylistInfo,
    ) -> Result<(usize, usize), MusicError> {
        if !self.is_connected() {
            return Err(MusicError::BotNotInVoiceChannel);
        }

        let mut added = 0;
        let mut failed = 0;
        for (url, metadata) in &playlist.entries {
            let queued = Track::from_metadata(requester.clone(), url, metadata)
                .map_err(MusicError::from)
                .and_then(|track| self.add_track(track));
            match queued {
                Ok(_) => added += 1,
                Err(e) => {
                    debug!("skipping playlist entry {url}: {e}");
                    failed += 1;
                }
            }
        }
        Ok((added, failed))
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        // Queue looping expects the playing track to be somewhere in the rotation.
        if mode == LoopMode::Queue {
            if let Some(current) = &self.current {
                let queued = self
                    .queue
                    .iter()
                    .any(|t| t.entry_id() == current.entry_id());
                if !queued {
                    self.queue.push_back(current.clone());
                }
            }
        }
        self.loop_mode = mode;
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        self.shuffle = enabled;
    }

    fn queue_index(&self, position: usize) -> Result<usize, MusicError> {
        if position == 0 || position > self.queue.len() {
            return Err(MusicError::InvalidIndex {
                index: position,
                len: self.queue.len(),
            });
        }
        Ok(position - 1)
    }

    /// Removes the track at 1-based `position`.
    pub fn remove(&mut self, position: usize) -> Result<Track, MusicError> {
        let index = self.queue_index(position)?;
        self.queue.remove(index).ok_or(MusicError::InvalidIndex {
            index: position,
            len: self.queue.len(),
        })
    }

    pub fn swap(&mut self, first: usize, second: usize) -> Result<(Track, Track), MusicError> {
        let i = self.queue_index(first)?;
        let j = self.queue_index(second)?;
        self.queue.swap(i, j);
        Ok((self.queue[j].clone(), self.queue[i].clone()))
    }

    /// Moves the track at `from` so that it ends up at `to` (both 1-based).
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<Track, MusicError> {
        let from_index = self.queue_index(from)?;
        let to_index = self.queue_index(to)?;
        let track = self.remove(from)?;
        self.queue.insert(to_index.min(self.queue.len()), track.clone());
        debug!("moved {from_index} -> {to_index} (guild: {})", self.guild_id);
        Ok(track)
    }

    pub fn page_count(&self) -> usize {
        last_page_index(self.queue.len(), self.services.settings.page_size) + 1
    }

    pub fn page(&self, index: usize) -> Result<QueuePage, MusicError> {
        if self.current.is_none() && self.queue.is_empty() {
            return Err(MusicError::QueueEmpty);
        }

        let page_size = self.services.settings.page_size.max(1);
        let last_index = last_page_index(self.queue.len(), page_size);
        if index > last_index {
            return Err(MusicError::InvalidPage {
                pages: last_index + 1,
            });
        }

        let offset = index * page_size;
        Ok(QueuePage {
            index,
            last_index,
            offset,
            tracks: self.queue.iter().skip(offset).take(page_size).cloned().collect(),
            current: if index == 0 { self.current.clone() } else { None },
            total_len: self.queue.len(),
            total_duration: self.queue.iter().map(Track::duration).sum(),
            loop_mode: self.loop_mode,
            shuffle: self.shuffle,
        })
    }

    pub fn now_playing(&self) -> Result<NowPlaying, MusicError> {
        let track = self.current.clone().ok_or(MusicError::NothingPlaying)?;
        Ok(NowPlaying {
            track,
            elapsed: self.elapsed(),
            paused: self.is_paused(),
            loop_mode: self.loop_mode,
            shuffle: self.shuffle,
        })
    }

    /// Picks the next current track.
    ///
    /// Track loop keeps the current track unless `force_skip` is set. Otherwise
    /// the head (or a random entry when shuffling) leaves the queue, and under
    /// queue loop it is put straight back at the tail.
    pub fn advance(&mut self, force_skip: bool) -> Option<&Track> {
        if self.loop_mode == LoopMode::Track && !force_skip && self.current.is_some() {
            return self.current.as_ref();
        }
        if self.queue.is_empty() {
            self.current = None;
            return None;
        }

        let index = if self.shuffle {
            rand::thread_rng().gen_range(0..self.queue.len())
        } else {
            0
        };
        let track = self.queue.remove(index)?;
        if self.loop_mode == LoopMode::Queue {
            self.queue.push_back(track.clone());
        }
        self.current = Some(track);
        self.current.as_ref()
    }

    /// Starts the next track, or arms the idle timer when there is none.
    ///
    /// Tracks whose stream cannot be resolved are reported and dropped for
    /// this transition.
    pub async fn play_next(&mut self, force_skip: bool) -> PlayNext {
        self.vote_skips.clear();
        let Some(voice) = self.voice.clone() else {
            return PlayNext::Disconnected;
        };

        // Every candidate gets one try before the session gives up.
        let budget = self.queue.len() + usize::from(self.current.is_some());
        let mut force_skip = force_skip;
        let mut failures = 0;
        loop {
            let Some(track) = self.advance(force_skip).cloned() else {
                return self.finish_queue();
            };
            self.cancel_idle_timer();
            self.generation += 1;

            match self.start(&voice, &track).await {
                Ok(()) => {
                    info!("now playing: {} (guild: {})", track.title(), self.guild_id);
                    return PlayNext::Started(track);
                }
                Err(e) => {
                    warn!("could not play {} (guild: {}): {e}", track.url(), self.guild_id);
                    self.notify(Notice::PlaybackFailed {
                        track,
                        reason: e.to_string(),
                    })
                    .await;
                    failures += 1;
                    if failures >= budget {
                        self.current = None;
                        return self.finish_queue();
                    }
                    force_skip = true;
                }
            }
        }
    }

    async fn start(&mut self, voice: &Arc<dyn VoiceSession>, track: &Track) -> Result<(), MusicError> {
        let stream = self.services.resolver.stream(track.url()).await?;
        let on_end = TrackEndSignal::new(self.guild_id, self.generation, self.events.clone());
        voice.play(stream, on_end).await?;
        self.started_at = Some(Instant::now());
        self.paused_at = None;
        Ok(())
    }

    fn finish_queue(&mut self) -> PlayNext {
        self.started_at = None;
        self.paused_at = None;
        self.generation += 1;
        self.arm_idle_timer();
        info!("queue ended (guild: {})", self.guild_id);
        PlayNext::QueueEnded
    }

    /// Natural end of a track, delivered through the event loop. Ends of
    /// tracks that were already replaced or stopped are ignored.
    pub async fn on_track_end(&mut self, generation: u64) -> Option<PlayNext> {
        if generation != self.generation || self.voice.is_none() || self.current.is_none() {
            debug!("ignoring stale track end (guild: {})", self.guild_id);
            return None;
        }

        let next = self.play_next(false).await;
        match &next {
            PlayNext::Started(track) => {
                self.notify(Notice::NowPlaying {
                    track: track.clone(),
                    loop_mode: self.loop_mode,
                })
                .await;
            }
            PlayNext::QueueEnded => self.notify(Notice::QueueEnded).await,
            PlayNext::Disconnected => {}
        }
        Some(next)
    }

    pub async fn pause(&mut self) -> Result<Track, MusicError> {
        let voice = self.voice.clone().ok_or(MusicError::NothingToPause)?;
        let track = self.current.clone().ok_or(MusicError::NothingToPause)?;
        if !voice.is_playing().await {
            return Err(MusicError::NothingToPause);
        }
        voice.pause().await?;
        self.paused_at = Some(Instant::now());
        Ok(track)
    }

    pub async fn resume(&mut self) -> Result<Track, MusicError> {
        let voice = self.voice.clone().ok_or(MusicError::NothingToResume)?;
        let track = self.current.clone().ok_or(MusicError::NothingToResume)?;
        if !voice.is_paused().await {
            return Err(MusicError::NothingToResume);
        }
        voice.resume().await?;
        if let (Some(started), Some(paused)) = (self.started_at, self.paused_at.take()) {
            self.started_at = Some(started + paused.elapsed());
        }
        Ok(track)
    }

    /// Stops the current track and moves on, ignoring track loop for this
    /// one transition.
    pub async fn skip(&mut self) -> Result<(Track, PlayNext), MusicError> {
        let voice = self.voice.clone().ok_or(MusicError::BotNotInVoiceChannel)?;
        let skipped = self.current.clone().ok_or(MusicError::NothingPlaying)?;
        voice.stop().await;
        let next = self.play_next(true).await;
        Ok((skipped, next))
    }

    pub async fn vote_skip(&mut self, voter: UserId) -> Result<VoteOutcome, MusicError> {
        let voice = self.voice.clone().ok_or(MusicError::BotNotInVoiceChannel)?;
        if self.current.is_none() {
            return Err(MusicError::NothingPlaying);
        }
        if !self.vote_skips.insert(voter) {
            return Err(MusicError::AlreadyVoted);
        }

        let members = voice.channel_members().await;
        self.vote_skips.retain(|id| members.contains(id));

        let votes = self.vote_skips.len();
        let required = skip_quorum(members.len());
        debug!("skip vote {votes}/{required} (guild: {})", self.guild_id);

        if votes < required {
            return Ok(VoteOutcome::Recorded { votes, required });
        }
        let (skipped, next) = self.skip().await?;
        Ok(VoteOutcome::Skipped {
            votes,
            required,
            skipped,
            next,
        })
    }

    fn arm_idle_timer(&mut self) {
        self.cancel_idle_timer();
        self.idle_seq += 1;

        let timer = self.idle_seq;
        let guild_id = self.guild_id;
        let events = self.events.clone();
        let timeout = self.services.settings.idle_timeout;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = events.send(SessionEvent::IdleTimeout { guild_id, timer });
        });
        self.idle_timer = Some(IdleTimer { id: timer, handle });
    }

    fn cancel_idle_timer(&mut self) {
        if let Some(timer) = self.idle_timer.take() {
            timer.handle.abort();
        }
    }

    /// Returns whether the session was disconnected.
    pub async fn on_idle_timeout(&mut self, timer: u64) -> bool {
        if self.idle_timer.as_ref().map(|t| t.id) != Some(timer) {
            return false;
        }
        self.idle_timer = None;
        if self.voice.is_none() {
            return false;
        }

        info!("idle timeout, leaving voice (guild: {})", self.guild_id);
        self.notify(Notice::IdleDisconnect).await;
        self.disconnect().await;
        true
    }

    async fn notify(&self, notice: Notice) {
        if let Some(channel) = self.announce_channel {
            self.services.notifier.notify(channel, notice).await;
        }
    }
}
