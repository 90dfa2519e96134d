use crate::utils::embed;
use crate::{Context, Error};

/// Swap two tracks in the queue
#[poise::command(slash_command, guild_only)]
pub async fn swap(
    ctx: Context<'_>,
    #[description = "First queue position"]
    #[min = 1]
    first: usize,
    #[description = "Second queue position"]
    #[min = 1]
    second: usize,
) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        match session.check_same_channel(user_channel).await {
            Ok(_) => session
                .swap(first, second)
                .map(|(a, b)| embed::swapped((first, &a), (second, &b))),
            Err(e) => Err(e),
        }
    };
    super::reply_result(ctx, result).await
}
