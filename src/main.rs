use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ckbot::bot::gate::ChannelGatePolicy;
use ckbot::bot::lifecycle::BotLifecycleController;
use ckbot::bot::platform::SerenityPlatform;
use ckbot::commands;
use ckbot::commands::music::audio_sources::spotify::{MusicPlatformClient, SpotifyApi};
use ckbot::commands::music::utils::media_resolver::MediaResolver;
use ckbot::config::Config;
use ckbot::{Data, Error, events};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ckbot=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    // Missing credentials abort here, before anything connects
    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let spotify = Arc::new(SpotifyApi::new(config.spotify.clone()));
    spotify.authenticate().await?;
    let resolver = Arc::new(MediaResolver::new(spotify));

    let lifecycle = Arc::new(BotLifecycleController::new(
        config.guild_id,
        config.should_sync_commands,
        commands::command_groups(),
    ));
    let gate = ChannelGatePolicy::new(config.bot_channel_id);

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            command_check: Some(|ctx| Box::pin(events::command_check(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, _framework| {
            Box::pin(async move {
                Ok(Data {
                    lifecycle,
                    platform: SerenityPlatform::new(ctx.http.clone()),
                    gate,
                    resolver,
                })
            })
        })
        .build();

    info!(
        "Starting bot for guild {} in channel {}",
        config.guild_id, config.bot_channel_id
    );
    let mut client = serenity::ClientBuilder::new(&config.client_token, intents)
        .framework(framework)
        .await?;

    client.start().await.map_err(Into::into)
}
