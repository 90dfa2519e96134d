use poise::CreateReply;
use tracing::info;

use crate::music::session::PlayNext;
use crate::music::{MusicError, Track};
use crate::utils::{components, embed};
use crate::{Context, Error};

async fn play_impl(ctx: Context<'_>, query: String) -> Result<(), Error> {
    let Some(user_channel) = super::user_voice_channel(ctx) else {
        return super::reply_result(ctx, Err(MusicError::NotInVoiceChannel)).await;
    };
    let shared = super::session(ctx).await?;

    // Reject early so nobody waits on yt-dlp just to be told to switch channels.
    let busy_elsewhere = shared.lock().await.check_same_channel(Some(user_channel)).await;
    if let Err(e @ MusicError::WrongChannel { .. }) = busy_elsewhere {
        return super::reply_result(ctx, Err(e)).await;
    }

    ctx.defer().await?;

    let resolver = ctx.data().sessions.services().resolver.clone();
    let resolved = Track::from_query(resolver.as_ref(), super::requester(ctx), &query).await;
    let track = match resolved {
        Ok(track) => track,
        Err(e) => {
            info!("could not resolve {query:?}: {e}");
            return super::reply_result(ctx, Err(e.into())).await;
        }
    };

    let mut session = shared.lock().await;
    if let Err(e) = session.ensure_joined(Some(user_channel)).await {
        drop(session);
        return super::reply_result(ctx, Err(e)).await;
    }
    let position = match session.add_track(track.clone()) {
        Ok(position) => position,
        Err(e) => {
            drop(session);
            return super::reply_result(ctx, Err(e)).await;
        }
    };

    let reply = if session.current().is_none() {
        match session.play_next(false).await {
            PlayNext::Started(started) => CreateReply::default()
                .embed(embed::now_playing_notice(&started, session.loop_mode()))
                .components(vec![components::music_buttons(false)]),
            PlayNext::QueueEnded | PlayNext::Disconnected => {
                CreateReply::default().embed(embed::queue_ended())
            }
        }
    } else {
        CreateReply::default().embed(embed::added_to_queue(&track, position))
    };
    drop(session);

    ctx.send(reply).await?;
    Ok(())
}

/// Play audio from a URL or search keyword
#[poise::command(slash_command, guild_only)]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Track URL or search keyword"] query: String,
) -> Result<(), Error> {
    play_impl(ctx, query).await
}

/// Play audio from a URL or search keyword (short for /play)
#[poise::command(slash_command, guild_only)]
pub async fn p(
    ctx: Context<'_>,
    #[description = "Track URL or search keyword"] query: String,
) -> Result<(), Error> {
    play_impl(ctx, query).await
}
