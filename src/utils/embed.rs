use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::id::ChannelId;
use serenity::model::mention::Mentionable;

use super::{format_duration, progress_bar, truncate_str};
use crate::music::session::{NowPlaying, PlayNext, QueuePage, VoteOutcome};
use crate::music::source::PlaylistInfo;
use crate::music::voice::JoinOutcome;
use crate::music::{LoopMode, Track};

/// Operations: joins, track changes, setting changes.
const COLOR_PLAY: u32 = 0xa7c080;
/// Read-only status: queue, now playing.
const COLOR_STATUS: u32 = 0xdbbc7f;
const COLOR_ERROR: u32 = 0xe67e80;

const MAX_TITLE_CHARS: usize = 80;

fn track_link(track: &Track) -> String {
    format!(
        "[{}]({})",
        truncate_str(track.title(), MAX_TITLE_CHARS),
        track.url()
    )
}

fn loop_line(mode: LoopMode) -> Option<&'static str> {
    match mode {
        LoopMode::Off => None,
        LoopMode::Queue => Some("🔁 Looping the queue"),
        LoopMode::Track => Some("🔂 Looping the current track"),
    }
}

pub fn join(outcome: JoinOutcome) -> CreateEmbed {
    let (title, channel) = match outcome {
        JoinOutcome::Joined(ch) => ("🙋 Joined your voice channel!", Some(ch)),
        JoinOutcome::Moved(ch) => ("🏃 Moved to your voice channel!", Some(ch)),
        JoinOutcome::AlreadyThere(_) => ("🤷 Already in your voice channel!", None),
        JoinOutcome::UserNotInChannel => ("🤷 You're not in a voice channel!", None),
        JoinOutcome::ReconnectCooldown => ("⏳ Wait before reconnecting!", None),
    };

    let mut embed = CreateEmbed::new().title(title);
    embed = match channel {
        Some(ch) => embed.color(COLOR_PLAY).description(format!("🔊 {}", ch.mention())),
        None => embed.color(COLOR_ERROR),
    };
    embed
}

pub fn left(channel: ChannelId) -> CreateEmbed {
    CreateEmbed::new()
        .title("🙋 Left your voice channel!")
        .description(format!("🔊 {}", channel.mention()))
        .color(COLOR_PLAY)
}

pub fn now_playing_notice(track: &Track, loop_mode: LoopMode) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎵 Now playing")
        .description(track_link(track))
        .thumbnail(track.thumbnail())
        .field("Uploader", track.uploader(), true)
        .field("Duration", format_duration(track.duration()), true)
        .field("Requested by", &track.adder().name, true)
        .color(COLOR_PLAY);

    if let Some(line) = loop_line(loop_mode) {
        embed = embed.footer(CreateEmbedFooter::new(line));
    }
    embed
}

pub fn now_playing(status: &NowPlaying) -> CreateEmbed {
    let track = &status.track;
    let elapsed = status.elapsed.as_secs().min(track.duration());
    let title = if status.paused {
        "⏸️ Paused"
    } else {
        "🎵 Now playing"
    };

    let mut embed = CreateEmbed::new()
        .title(title)
        .description(track_link(track))
        .thumbnail(track.thumbnail())
        .field(
            "\u{200b}",
            format!(
                "{} {} {}",
                format_duration(elapsed),
                progress_bar(status.elapsed, track.duration()),
                format_duration(track.duration())
            ),
            false,
        )
        .field("Requested by", &track.adder().name, true)
        .color(COLOR_STATUS);

    let mut footer = Vec::new();
    if let Some(line) = loop_line(status.loop_mode) {
        footer.push(line);
    }
    if status.shuffle {
        footer.push("🔀 Shuffle on");
    }
    if !footer.is_empty() {
        embed = embed.footer(CreateEmbedFooter::new(footer.join("\n")));
    }
    embed
}

pub fn added_to_queue(track: &Track, position: usize) -> CreateEmbed {
    CreateEmbed::new()
        .title("✅ Added to queue")
        .description(track_link(track))
        .thumbnail(track.thumbnail())
        .field("Duration", format_duration(track.duration()), true)
        .field("Position", format!("#{position}"), true)
        .color(COLOR_PLAY)
}

pub fn playlist_loading() -> CreateEmbed {
    CreateEmbed::new()
        .title("⏳ Loading playlist...")
        .color(COLOR_STATUS)
}

pub fn playlist_added(
    url: &str,
    playlist: &PlaylistInfo,
    added: usize,
    failed: usize,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("✅ Playlist added to queue")
        .description(format!("[{}]({url})", playlist.title))
        .field("Uploader", &playlist.uploader, true)
        .field("Tracks", format!("{added}/{}", playlist.count), true)
        .color(COLOR_PLAY);

    if failed > 0 {
        embed = embed.footer(CreateEmbedFooter::new(format!(
            "⚠️ {failed} track(s) could not be added"
        )));
    }
    embed
}

pub fn queue_page(page: &QueuePage) -> CreateEmbed {
    let mut description = String::new();
    if let Some(line) = loop_line(page.loop_mode) {
        description.push_str(line);
        description.push('\n');
    }
    if page.shuffle {
        description.push_str("🔀 Shuffle on\n");
    }
    if let Some(track) = &page.current {
        description.push_str(&format!(
            "\n**🎵 Now playing:** {} `{}`\n",
            track_link(track),
            format_duration(track.duration())
        ));
    }

    if page.tracks.is_empty() {
        description.push_str("\nNo tracks waiting.");
    } else {
        description.push('\n');
        for (i, track) in page.tracks.iter().enumerate() {
            description.push_str(&format!(
                "**{}.** {} `{}`\n",
                page.offset + i + 1,
                track_link(track),
                format_duration(track.duration())
            ));
        }
    }

    let range = if page.tracks.is_empty() {
        "0".to_string()
    } else {
        format!("{}-{}", page.offset + 1, page.offset + page.tracks.len())
    };

    CreateEmbed::new()
        .title("📃 Queue")
        .description(description)
        .color(COLOR_STATUS)
        .footer(CreateEmbedFooter::new(format!(
            "📄 {}/{}  💿 {range}/{}  ⌛ {}",
            page.index + 1,
            page.last_index + 1,
            page.total_len,
            format_duration(page.total_duration)
        )))
}

fn next_line(next: &PlayNext) -> String {
    match next {
        PlayNext::Started(track) => format!("Up next: {}", track_link(track)),
        PlayNext::QueueEnded => "🏁 No more tracks in queue!".to_string(),
        PlayNext::Disconnected => String::new(),
    }
}

pub fn skipped(track: &Track, next: &PlayNext) -> CreateEmbed {
    CreateEmbed::new()
        .title("⏭️ Skipped")
        .description(format!("{}\n{}", track_link(track), next_line(next)))
        .color(COLOR_PLAY)
}

pub fn vote(outcome: &VoteOutcome) -> CreateEmbed {
    match outcome {
        VoteOutcome::Recorded { votes, required } => CreateEmbed::new()
            .title("🗳️ Vote to skip recorded")
            .description(format!("{votes}/{required} votes"))
            .color(COLOR_STATUS),
        VoteOutcome::Skipped {
            votes,
            required,
            skipped: track,
            next,
        } => skipped(track, next).footer(CreateEmbedFooter::new(format!(
            "🗳️ {votes}/{required} votes"
        ))),
    }
}

pub fn paused(track: &Track) -> CreateEmbed {
    CreateEmbed::new()
        .title("⏸️ Paused")
        .description(track_link(track))
        .color(COLOR_PLAY)
}

pub fn resumed(track: &Track) -> CreateEmbed {
    CreateEmbed::new()
        .title("▶️ Resumed")
        .description(track_link(track))
        .color(COLOR_PLAY)
}

pub fn loop_changed(mode: LoopMode, current: Option<&Track>) -> CreateEmbed {
    let title = match mode {
        LoopMode::Off => "➡️ Loop is off",
        LoopMode::Queue => "🔁 Looping the queue",
        LoopMode::Track => "🔂 Looping the current track",
    };
    let mut embed = CreateEmbed::new().title(title).color(COLOR_PLAY);
    if let (LoopMode::Track, Some(track)) = (mode, current) {
        embed = embed.description(track_link(track));
    }
    embed
}

pub fn shuffle_changed(enabled: bool) -> CreateEmbed {
    let title = if enabled {
        "🔀 Shuffle is on"
    } else {
        "➡️ Shuffle is off"
    };
    CreateEmbed::new().title(title).color(COLOR_PLAY)
}

pub fn removed(track: &Track, position: usize) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("🗑️ Removed #{position}"))
        .description(track_link(track))
        .color(COLOR_PLAY)
}

pub fn swapped(first: (usize, &Track), second: (usize, &Track)) -> CreateEmbed {
    CreateEmbed::new()
        .title("🔃 Swapped tracks")
        .description(format!(
            "#{} {}\n#{} {}",
            first.0,
            track_link(second.1),
            second.0,
            track_link(first.1)
        ))
        .color(COLOR_PLAY)
}

pub fn moved(track: &Track, position: usize) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("↕️ Moved to #{position}"))
        .description(track_link(track))
        .color(COLOR_PLAY)
}

pub fn queue_ended() -> CreateEmbed {
    CreateEmbed::new()
        .title("🏁 No more tracks in queue!")
        .color(COLOR_PLAY)
}

pub fn idle_disconnect() -> CreateEmbed {
    CreateEmbed::new()
        .title("🛌 Left voice channel due to inactivity!")
        .color(COLOR_PLAY)
}

pub fn playback_failed(track: &Track, reason: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("⚠️ Couldn't play a track, skipping it")
        .description(format!("{}\n{reason}", track_link(track)))
        .color(COLOR_ERROR)
}

pub fn help(commands: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("Jack help")
        .field("Music", commands, false)
        .color(COLOR_STATUS)
}

pub fn error(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(message)
        .color(COLOR_ERROR)
}
