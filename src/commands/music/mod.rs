//! Commands for turning Spotify links and searches into playable tracks.

pub mod resolve;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context, Data, Error};

/// Commands belonging to the music group, freshly built.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![resolve::resolve()]
}
