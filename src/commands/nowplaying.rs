use poise::CreateReply;

use crate::utils::{components, embed};
use crate::{Context, Error};

/// Show the track that is playing right now
#[poise::command(slash_command, guild_only)]
pub async fn np(ctx: Context<'_>) -> Result<(), Error> {
    let shared = super::session(ctx).await?;
    let status = shared.lock().await.now_playing();

    match status {
        Ok(status) => {
            ctx.send(
                CreateReply::default()
                    .embed(embed::now_playing(&status))
                    .components(vec![components::music_buttons(status.paused)]),
            )
            .await?;
            Ok(())
        }
        Err(e) => super::reply_result(ctx, Err(e)).await,
    }
}
