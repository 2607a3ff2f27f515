//! Startup configuration read from the environment (optionally via `.env`).

use std::env;

use serenity::model::id::{ChannelId, GuildId};
use thiserror::Error;

use crate::commands::music::audio_sources::spotify::SpotifyCredentials;

/// Errors raised while reading the startup configuration.
/// Any of these aborts startup before a session is created.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}': expected a non-zero Discord id")]
    InvalidId { key: &'static str, value: String },
}

/// Everything the bot needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token.
    pub client_token: String,
    /// Push the guild command tree on the first ready event.
    pub should_sync_commands: bool,
    pub spotify: SpotifyCredentials,
    /// The only channel commands may run in.
    pub bot_channel_id: ChannelId,
    /// Guild the command tree is registered and synced against.
    pub guild_id: GuildId,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigurationError::Missing(key))
        };

        let client_token = required("CLIENT_TOKEN")?;
        let should_sync_commands = lookup("SHOULD_SYNC_COMMANDS").as_deref() == Some("1");

        let spotify = SpotifyCredentials {
            client_id: required("SPOTIPY_CLIENT_ID")?,
            client_secret: required("SPOTIPY_CLIENT_SECRET")?,
            redirect_uri: lookup("SPOTIPY_REDIRECT_URI"),
            scope: lookup("SPOTIPY_SCOPE"),
            username: lookup("SPOTIFY_USERNAME"),
        };

        let bot_channel_id = ChannelId::new(parse_id(
            "CK_BOT_CHANNEL_ID",
            required("CK_BOT_CHANNEL_ID")?,
        )?);
        let guild_id = GuildId::new(parse_id("CK_GUILD_ID", required("CK_GUILD_ID")?)?);

        Ok(Self {
            client_token,
            should_sync_commands,
            spotify,
            bot_channel_id,
            guild_id,
        })
    }
}

/// Discord ids are non-zero snowflakes; serenity panics on zero.
fn parse_id(key: &'static str, value: String) -> Result<u64, ConfigurationError> {
    match value.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(ConfigurationError::InvalidId { key, value }),
    }
}
