use poise::CreateReply;
use tracing::info;

use crate::music::session::PlayNext;
use crate::music::source::{self, QueryKind};
use crate::music::MusicError;
use crate::utils::{components, embed};
use crate::{Context, Error};

async fn playlist_impl(ctx: Context<'_>, url: String) -> Result<(), Error> {
    let url = url.trim().to_string();
    if source::classify_query(&url) != QueryKind::Playlist {
        return super::reply_result(ctx, Err(MusicError::NotAPlaylist)).await;
    }

    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;
    let joined = shared.lock().await.ensure_joined(user_channel).await;
    if let Err(e) = joined {
        return super::reply_result(ctx, Err(e)).await;
    }

    let loading = ctx
        .send(CreateReply::default().embed(embed::playlist_loading()))
        .await?;

    let resolver = ctx.data().sessions.services().resolver.clone();
    let playlist = match resolver.resolve_playlist(&url).await {
        Ok(playlist) => playlist,
        Err(e) => {
            info!("could not load playlist {url}: {e}");
            let reply = CreateReply::default().embed(embed::error(&MusicError::from(e).to_string()));
            loading.edit(ctx, reply).await?;
            return Ok(());
        }
    };

    let requester = super::requester(ctx);
    let mut session = shared.lock().await;
    // The session may have left voice while the playlist was loading.
    let queued = match session.ensure_joined(user_channel).await {
        Ok(_) => session.add_playlist(&requester, &playlist),
        Err(e) => Err(e),
    };
    let (added, failed) = match queued {
        Ok(counts) => counts,
        Err(e) => {
            drop(session);
            loading
                .edit(ctx, CreateReply::default().embed(embed::error(&e.to_string())))
                .await?;
            return Ok(());
        }
    };
    info!("queued {added} track(s) from {url}, {failed} failed");

    let started = if session.current().is_none() && added > 0 {
        match session.play_next(false).await {
            PlayNext::Started(track) => Some((track, session.loop_mode())),
            PlayNext::QueueEnded | PlayNext::Disconnected => None,
        }
    } else {
        None
    };
    drop(session);

    loading
        .edit(
            ctx,
            CreateReply::default().embed(embed::playlist_added(&url, &playlist, added, failed)),
        )
        .await?;

    if let Some((track, loop_mode)) = started {
        ctx.send(
            CreateReply::default()
                .embed(embed::now_playing_notice(&track, loop_mode))
                .components(vec![components::music_buttons(false)]),
        )
        .await?;
    }
    Ok(())
}

/// Queue every track of a YouTube playlist
#[poise::command(slash_command, guild_only)]
pub async fn playlist(
    ctx: Context<'_>,
    #[description = "Playlist URL"] url: String,
) -> Result<(), Error> {
    playlist_impl(ctx, url).await
}
