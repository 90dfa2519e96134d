use crate::utils::embed;
use crate::{Context, Error};

/// Remove a track from the queue
#[poise::command(slash_command, guild_only)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Queue position"]
    #[min = 1]
    position: usize,
) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        match session.check_same_channel(user_channel).await {
            Ok(_) => session
                .remove(position)
                .map(|track| embed::removed(&track, position)),
            Err(e) => Err(e),
        }
    };
    super::reply_result(ctx, result).await
}
