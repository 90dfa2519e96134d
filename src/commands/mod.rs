mod help;
mod join;
mod leave;
mod loop_cmd;
mod move_cmd;
mod nowplaying;
mod pause;
mod play;
mod playlist;
mod queue;
mod remove;
mod resume;
mod shuffle;
mod skip;
mod swap;

use poise::CreateReply;
use serenity::builder::CreateEmbed;
use serenity::model::id::ChannelId;

use crate::music::registry::SharedSession;
use crate::music::{MusicError, Requester};
use crate::utils::embed;
use crate::{Context, Error};

pub fn all() -> Vec<poise::Command<crate::Data, Error>> {
    vec![
        help::help(),
        join::join(),
        leave::leave(),
        play::play(),
        play::p(),
        playlist::playlist(),
        skip::skip(),
        skip::s(),
        pause::pause(),
        resume::resume(),
        nowplaying::np(),
        loop_cmd::loop_cmd(),
        shuffle::shuffle(),
        remove::remove(),
        swap::swap(),
        move_cmd::move_cmd(),
        queue::queue(),
        queue::q(),
    ]
}

/// The voice channel the invoking user is sitting in, read from the cache.
fn user_voice_channel(ctx: Context<'_>) -> Option<ChannelId> {
    let guild = ctx.guild()?;
    guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|vs| vs.channel_id)
}

/// Looks up this guild's session and points its notices at the invoking
/// text channel.
async fn session(ctx: Context<'_>) -> Result<SharedSession, Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let shared = ctx.data().sessions.get_or_register(guild_id).await;
    shared.lock().await.set_announce_channel(ctx.channel_id());
    Ok(shared)
}

fn requester(ctx: Context<'_>) -> Requester {
    Requester::new(ctx.author().id, ctx.author().name.clone())
}

async fn reply(ctx: Context<'_>, embed: CreateEmbed) -> Result<(), Error> {
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Expected failures are answered in the channel, not bubbled to poise.
async fn reply_result(
    ctx: Context<'_>,
    result: Result<CreateEmbed, MusicError>,
) -> Result<(), Error> {
    match result {
        Ok(embed) => reply(ctx, embed).await,
        Err(e) => {
            tracing::debug!("{} rejected: {e}", ctx.command().name);
            reply(ctx, embed::error(&e.to_string())).await
        }
    }
}
