use crate::utils::embed;
use crate::{Context, Error};

/// Turn shuffle on or off (toggles when left empty)
#[poise::command(slash_command, guild_only)]
pub async fn shuffle(
    ctx: Context<'_>,
    #[description = "Shuffle on or off"] enabled: Option<bool>,
) -> Result<(), Error> {
    let user_channel = super::user_voice_channel(ctx);
    let shared = super::session(ctx).await?;

    let result = {
        let mut session = shared.lock().await;
        session.check_same_channel(user_channel).await.map(|_| {
            let enabled = enabled.unwrap_or(!session.shuffle());
            session.set_shuffle(enabled);
            embed::shuffle_changed(enabled)
        })
    };
    super::reply_result(ctx, result).await
}
