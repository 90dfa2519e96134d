use crate::utils::embed;
use crate::{Context, Error};

const MUSIC_COMMANDS: &str = "\
`/join` — join your voice channel
`/leave` — clear the queue and leave
`/play` (`/p`) — play a URL or search keyword
`/playlist` — queue a whole playlist
`/skip` (`/s`) — vote to skip the current track
`/pause`, `/resume` — pause or resume playback
`/np` — show the current track
`/loop` — loop mode (off/queue/track)
`/shuffle` — toggle shuffle
`/remove`, `/swap`, `/move` — edit the queue
`/queue` (`/q`) — show the queue";

async fn help_impl(ctx: Context<'_>) -> Result<(), Error> {
    super::reply(ctx, embed::help(MUSIC_COMMANDS)).await
}

/// Lists Jack's commands
#[poise::command(slash_command, guild_only)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    help_impl(ctx).await
}
