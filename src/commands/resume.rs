use crate::utils::embed;
use crate::{Context, Error};

/// Resume the paused track
#[poise::command(slash_command, guild_only)]
pub async fn resume(ctx: Context<'_>) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        match session.check_same_channel(user_channel).await {
            Ok(_) => session.resume().await.map(|track| embed::resumed(&track)),
            Err(e) => Err(e),
        }
    };
    super::reply_result(ctx, result).await
}
