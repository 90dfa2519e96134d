use poise::CreateReply;

use crate::music::MusicError;
use crate::utils::{components, embed};
use crate::{Context, Error};

async fn queue_impl(ctx: Context<'_>, page: Option<usize>) -> Result<(), Error> {
    let shared = super::session(ctx).await?;

    let result = {
        let session = shared.lock().await;
        match page.unwrap_or(1).checked_sub(1) {
            Some(index) => session.page(index),
            None => Err(MusicError::InvalidPage {
                pages: session.page_count(),
            }),
        }
    };

    match result {
        Ok(page) => {
            ctx.send(
                CreateReply::default()
                    .embed(embed::queue_page(&page))
                    .components(vec![components::queue_page_buttons(page.index)]),
            )
            .await?;
            Ok(())
        }
        Err(e) => super::reply_result(ctx, Err(e)).await,
    }
}

/// Show the queue
#[poise::command(slash_command, guild_only)]
pub async fn queue(
    ctx: Context<'_>,
    #[description = "Page number"] page: Option<usize>,
) -> Result<(), Error> {
    queue_impl(ctx, page).await
}

/// Show the queue (short for /queue)
#[poise::command(slash_command, guild_only)]
pub async fn q(
    ctx: Context<'_>,
    #[description = "Page number"] page: Option<usize>,
) -> Result<(), Error> {
    queue_impl(ctx, page).await
}
