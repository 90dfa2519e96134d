use crate::music::LoopMode;
use crate::utils::embed;
use crate::{Context, Error};

/// Set the loop mode
#[poise::command(slash_command, guild_only, rename = "loop")]
pub async fn loop_cmd(
    ctx: Context<'_>,
    #[description = "Loop mode (off/queue/track)"] mode: String,
) -> Result<(), Error> {
    let Ok(mode) = mode.parse::<LoopMode>() else {
        return super::reply(ctx, embed::error("Pick a loop mode: `off`, `queue` or `track`")).await;
    };

    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        session.check_same_channel(user_channel).await.map(|_| {
            session.set_loop_mode(mode);
            embed::loop_changed(mode, session.current())
        })
    };
    super::reply_result(ctx, result).await
}
