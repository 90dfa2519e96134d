use std::sync::Arc;

use jack_music_bot::music::player::SongbirdGateway;
use jack_music_bot::music::source::YtDlp;
use jack_music_bot::music::{Services, SessionRegistry};
use jack_music_bot::utils::notifier::ChannelNotifier;
use jack_music_bot::{commands, config, events, Data};
use poise::serenity_prelude as serenity;
use songbird::SerenityInit;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let test_guild_id = config.test_guild_id;
    let ytdlp_path = config.ytdlp_path.clone();
    let settings = config.settings.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                match test_guild_id {
                    Some(id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(id),
                        )
                        .await?;
                        tracing::info!("commands registered in test guild {id}");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                    }
                }

                let manager = songbird::get(ctx).await.expect("Songbird not registered");
                let services = Services {
                    resolver: Arc::new(YtDlp::new(ytdlp_path)),
                    gateway: Arc::new(SongbirdGateway::new(
                        manager,
                        ctx.cache.clone(),
                        reqwest::Client::new(),
                    )),
                    notifier: Arc::new(ChannelNotifier::new(ctx.http.clone())),
                    settings,
                };

                let (sessions, session_events) = SessionRegistry::new(services);
                for guild in &ready.guilds {
                    sessions.register(guild.id).await;
                }
                tokio::spawn(sessions.clone().run(session_events));

                tracing::info!("{} is connected to {} guild(s)", ready.user.name, ready.guilds.len());
                Ok(Data { sessions })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .register_songbird()
        .await
        .expect("failed to create client");

    if let Err(e) = client.start().await {
        tracing::error!("client error: {e}");
    }
}
