use serenity::model::id::ChannelId;

/// Errors from the media-extraction side (yt-dlp).
#[derive(Debug)]
pub enum ResolveError {
    /// The URL is not handled by any extractor.
    Unsupported(String),
    /// The platform refused the content (age restriction, copyright claim, private video).
    Blocked(String),
    /// A field a track cannot exist without was missing from the metadata.
    MissingField(&'static str),
    /// A keyword search returned nothing.
    NoResults,
    /// yt-dlp exited unsuccessfully for a reason we don't classify.
    Failed(String),
    /// yt-dlp could not be spawned.
    Io(std::io::Error),
    /// yt-dlp printed something that isn't the JSON we expect.
    Json(serde_json::Error),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported(url) => write!(f, "unsupported link: {url}"),
            Self::Blocked(reason) => write!(f, "link blocked by the platform: {reason}"),
            Self::MissingField(field) => write!(f, "track metadata is missing `{field}`"),
            Self::NoResults => write!(f, "no results found"),
            Self::Failed(stderr) => write!(f, "yt-dlp error: {stderr}"),
            Self::Io(e) => write!(f, "could not run yt-dlp: {e}"),
            Self::Json(e) => write!(f, "unexpected yt-dlp output: {e}"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<std::io::Error> for ResolveError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Errors from the voice layer.
#[derive(Debug)]
pub enum VoiceError {
    /// The gateway has not finished tearing down a previous connection.
    Cooldown,
    Gateway(String),
    Playback(String),
}

impl std::fmt::Display for VoiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cooldown => write!(f, "voice connection is still closing"),
            Self::Gateway(e) => write!(f, "voice gateway error: {e}"),
            Self::Playback(e) => write!(f, "playback error: {e}"),
        }
    }
}

impl std::error::Error for VoiceError {}

/// Expected, user-facing failures of music commands.
///
/// None of these leave a session half-mutated: every operation validates
/// before it touches the queue.
#[derive(Debug)]
pub enum MusicError {
    NotInVoiceChannel,
    BotNotInVoiceChannel,
    WrongChannel { bot_channel: ChannelId },
    Resolution(ResolveError),
    InvalidPage { pages: usize },
    InvalidIndex { index: usize, len: usize },
    AlreadyVoted,
    ReconnectCooldown,
    NothingPlaying,
    NothingToPause,
    NothingToResume,
    QueueEmpty,
    QueueFull { limit: usize },
    NotAPlaylist,
    Voice(VoiceError),
}

impl std::fmt::Display for MusicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInVoiceChannel => write!(f, "You're not in a voice channel!"),
            Self::BotNotInVoiceChannel => write!(f, "Jack is not in a voice channel!"),
            Self::WrongChannel { bot_channel } => write!(
                f,
                "You must be in the same voice channel as Jack (<#{bot_channel}>) to do that!"
            ),
            Self::Resolution(ResolveError::Blocked(_)) => write!(
                f,
                "Link blocked! Is the video age-restricted or copyright claimed?"
            ),
            Self::Resolution(ResolveError::Unsupported(_)) => {
                write!(f, "Invalid link! Please double check your link.")
            }
            Self::Resolution(ResolveError::NoResults) => write!(f, "No results found!"),
            Self::Resolution(e) => write!(f, "Couldn't load that track: {e}"),
            Self::InvalidPage { pages } => {
                write!(f, "Check your page number! There are {pages} page(s) in the queue.")
            }
            Self::InvalidIndex { index, len } => {
                write!(f, "There is no track #{index} (the queue has {len} track(s)).")
            }
            Self::AlreadyVoted => write!(f, "You already voted to skip this track!"),
            Self::ReconnectCooldown => write!(f, "Wait a moment before reconnecting!"),
            Self::NothingPlaying => write!(f, "Nothing is playing!"),
            Self::NothingToPause => write!(f, "Nothing to pause!"),
            Self::NothingToResume => write!(f, "Nothing to resume!"),
            Self::QueueEmpty => write!(f, "Queue is empty!"),
            Self::QueueFull { limit } => write!(f, "The queue is full ({limit} tracks)!"),
            Self::NotAPlaylist => write!(f, "That is not a playlist link!"),
            Self::Voice(e) => write!(f, "Voice error: {e}"),
        }
    }
}

impl std::error::Error for MusicError {}

impl From<ResolveError> for MusicError {
    fn from(e: ResolveError) -> Self {
        Self::Resolution(e)
    }
}

impl From<VoiceError> for MusicError {
    fn from(e: VoiceError) -> Self {
        match e {
            VoiceError::Cooldown => Self::ReconnectCooldown,
            other => Self::Voice(other),
        }
    }
}
