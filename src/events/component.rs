use poise::serenity_prelude as serenity;
use serenity::builder::{
    CreateActionRow, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use serenity::model::application::ComponentInteraction;
use serenity::model::id::{ChannelId, GuildId, UserId};
use tracing::debug;

use crate::music::registry::SharedSession;
use crate::music::MusicError;
use crate::utils::{components, embed};
use crate::{Data, Error};

async fn respond_ephemeral(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    message: &str,
) -> Result<(), Error> {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(embed::error(message))
            .ephemeral(true),
    );
    interaction.create_response(&ctx.http, response).await?;
    Ok(())
}

async fn respond(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    embed: CreateEmbed,
) -> Result<(), Error> {
    let response =
        CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().embed(embed));
    interaction.create_response(&ctx.http, response).await?;
    Ok(())
}

async fn update_message(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    embed: CreateEmbed,
    components: Vec<CreateActionRow>,
) -> Result<(), Error> {
    let response = CreateInteractionResponse::UpdateMessage(
        CreateInteractionResponseMessage::new()
            .embed(embed)
            .components(components),
    );
    interaction.create_response(&ctx.http, response).await?;
    Ok(())
}

fn user_voice_channel(ctx: &serenity::Context, guild_id: GuildId, user: UserId) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild.voice_states.get(&user).and_then(|vs| vs.channel_id)
}

pub async fn handle(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };
    let shared = data.sessions.get_or_register(guild_id).await;
    let custom_id = interaction.data.custom_id.as_str();

    if let Some(target) = components::parse_queue_page(custom_id) {
        return turn_queue_page(ctx, interaction, &shared, target).await;
    }

    let user_channel = user_voice_channel(ctx, guild_id, interaction.user.id);
    let mut session = shared.lock().await;
    if let Err(e) = session.check_same_channel(user_channel).await {
        drop(session);
        return respond_ephemeral(ctx, interaction, &e.to_string()).await;
    }
    session.set_announce_channel(interaction.channel_id);

    match custom_id {
        components::PAUSE | components::RESUME => {
            let toggled = if custom_id == components::PAUSE {
                session.pause().await
            } else {
                session.resume().await
            };
            let status = toggled.and_then(|_| session.now_playing());
            drop(session);
            match status {
                Ok(status) => {
                    let buttons = vec![components::music_buttons(status.paused)];
                    update_message(ctx, interaction, embed::now_playing(&status), buttons).await
                }
                Err(e) => respond_ephemeral(ctx, interaction, &e.to_string()).await,
            }
        }
        components::SKIP => {
            let outcome = session.vote_skip(interaction.user.id).await;
            drop(session);
            match outcome {
                Ok(outcome) => respond(ctx, interaction, embed::vote(&outcome)).await,
                Err(e) => respond_ephemeral(ctx, interaction, &e.to_string()).await,
            }
        }
        components::LEAVE => {
            let left = session.leave(user_channel).await;
            drop(session);
            match left {
                Ok(channel) => update_message(ctx, interaction, embed::left(channel), vec![]).await,
                Err(e) => respond_ephemeral(ctx, interaction, &e.to_string()).await,
            }
        }
        other => {
            debug!("unknown component {other} (guild: {guild_id})");
            Ok(())
        }
    }
}

async fn turn_queue_page(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    shared: &SharedSession,
    target: Option<usize>,
) -> Result<(), Error> {
    let Some(index) = target else {
        return respond_ephemeral(ctx, interaction, "Already at the first page!").await;
    };

    let page = shared.lock().await.page(index);
    match page {
        Ok(page) => {
            let buttons = vec![components::queue_page_buttons(page.index)];
            update_message(ctx, interaction, embed::queue_page(&page), buttons).await
        }
        Err(MusicError::InvalidPage { .. }) => {
            respond_ephemeral(ctx, interaction, "Already at the last page!").await
        }
        Err(e) => respond_ephemeral(ctx, interaction, &e.to_string()).await,
    }
}
