use poise::serenity_prelude as serenity;
use tracing::info;

use crate::{Data, Error};

/// Resets the guild's session when the bot is removed from voice by someone
/// else (kicked, dragged out, channel deleted).
pub async fn handle(
    ctx: &serenity::Context,
    _old: &Option<serenity::VoiceState>,
    new: &serenity::VoiceState,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = new.guild_id else {
        return Ok(());
    };
    if new.user_id != ctx.cache.current_user().id || new.channel_id.is_some() {
        return Ok(());
    }

    let Some(shared) = data.sessions.get(guild_id).await else {
        return Ok(());
    };
    let reset = shared.lock().await.handle_external_disconnect().await;
    if reset {
        info!("bot left voice outside a command (guild: {guild_id})");
    }
    Ok(())
}
