use crate::utils::embed;
use crate::{Context, Error};

async fn skip_impl(ctx: Context<'_>) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        match session.check_same_channel(user_channel).await {
            Ok(_) => session
                .vote_skip(ctx.author().id)
                .await
                .map(|outcome| embed::vote(&outcome)),
            Err(e) => Err(e),
        }
    };
    super::reply_result(ctx, result).await
}

/// Vote to skip the current track
#[poise::command(slash_command, guild_only)]
pub async fn skip(ctx: Context<'_>) -> Result<(), Error> {
    skip_impl(ctx).await
}

/// Vote to skip the current track (short for /skip)
#[poise::command(slash_command, guild_only)]
pub async fn s(ctx: Context<'_>) -> Result<(), Error> {
    skip_impl(ctx).await
}
