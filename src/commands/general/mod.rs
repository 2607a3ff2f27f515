//! General purpose commands available to everyone in the bot channel.

pub mod help;
pub mod ping;

use crate::{CommandResult, Context, Data, Error};

/// Commands belonging to the general group, freshly built.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![help::help(), ping::ping()]
}
