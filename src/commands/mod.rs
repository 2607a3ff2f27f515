//! This module aggregates all the command groups for the bot.

/// General purpose commands (e.g., ping, help).
pub mod general;
/// Commands resolving Spotify links and searches.
pub mod music;

use crate::bot::platform::CommandGroup;
use crate::{Data, Error};

/// Every command the framework dispatches.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    general::commands()
        .into_iter()
        .chain(music::commands())
        .collect()
}

/// The command groups registered with the guild on the first ready event.
pub fn command_groups() -> Vec<CommandGroup> {
    vec![
        CommandGroup::from_commands("general", &general::commands()),
        CommandGroup::from_commands("music", &music::commands()),
    ]
}
