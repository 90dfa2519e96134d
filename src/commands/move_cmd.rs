use crate::utils::embed;
use crate::{Context, Error};

/// Move a track to another queue position
#[poise::command(slash_command, guild_only, rename = "move")]
pub async fn move_cmd(
    ctx: Context<'_>,
    #[description = "Current queue position"]
    #[min = 1]
    from: usize,
    #[description = "New queue position"]
    #[min = 1]
    to: usize,
) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        match session.check_same_channel(user_channel).await {
            Ok(_) => session
                .move_track(from, to)
                .map(|track| embed::moved(&track, to)),
            Err(e) => Err(e),
        }
    };
    super::reply_result(ctx, result).await
}
