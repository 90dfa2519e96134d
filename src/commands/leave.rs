use crate::utils::embed;
use crate::{Context, Error};

/// Clear the queue and make Jack leave your voice channel
#[poise::command(slash_command, guild_only)]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        session.leave(user_channel).await.map(embed::left)
    };
    super::reply_result(ctx, result).await
}
