use crate::utils::embed;
use crate::{Context, Error};

/// Pause the current track
#[poise::command(slash_command, guild_only)]
pub async fn pause(ctx: Context<'_>) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        match session.check_same_channel(user_channel).await {
            Ok(_) => session.pause().await.map(|track| embed::paused(&track)),
            Err(e) => Err(e),
        }
    };
    super::reply_result(ctx, result).await
}
