//! Cool Kids bot: resolves Spotify links and search text into playable search
//! terms, and keeps its slash commands locked to a single bot channel.

use std::sync::Arc;

pub mod bot;
pub mod commands;
pub mod config;
pub mod events;

use bot::gate::ChannelGatePolicy;
use bot::lifecycle::BotLifecycleController;
use bot::platform::SerenityPlatform;
use commands::music::audio_sources::spotify::SpotifyApi;
use commands::music::utils::media_resolver::MediaResolver;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Resolver wired to the live Spotify Web API.
pub type SpotifyResolver = MediaResolver<SpotifyApi>;

/// User data shared with every command invocation and event.
pub struct Data {
    /// The one lifecycle controller for this process.
    pub lifecycle: Arc<BotLifecycleController>,
    /// Discord-side command tree used by the lifecycle controller.
    pub platform: SerenityPlatform,
    /// Channel restriction applied before every command.
    pub gate: ChannelGatePolicy,
    pub resolver: Arc<SpotifyResolver>,
}
