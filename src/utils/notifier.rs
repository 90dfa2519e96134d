use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tracing::warn;

use super::embed;
use crate::music::{Notice, Notifier};

/// Posts session notices as embeds in a text channel.
pub struct ChannelNotifier {
    http: Arc<Http>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, channel: ChannelId, notice: Notice) {
        let notice_embed = match &notice {
            Notice::NowPlaying { track, loop_mode } => embed::now_playing_notice(track, *loop_mode),
            Notice::QueueEnded => embed::queue_ended(),
            Notice::IdleDisconnect => embed::idle_disconnect(),
            Notice::PlaybackFailed { track, reason } => embed::playback_failed(track, reason),
        };

        if let Err(e) = channel
            .send_message(&self.http, CreateMessage::new().embed(notice_embed))
            .await
        {
            warn!("failed to post notice in {channel}: {e}");
        }
    }
}
