use crate::utils::embed;
use crate::{Context, Error};

/// Make Jack join your voice channel
#[poise::command(slash_command, guild_only)]
pub async fn join(ctx: Context<'_>) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        session.join(user_channel).await.map(embed::join)
    };
    super::reply_result(ctx, result).await
}
