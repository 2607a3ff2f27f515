use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use crate::bot::gate::ReplyNotifier;
use crate::{Context, Data, Error};

/// Framework-wide gateway event handler.
pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot } = event {
        info!("Logged on as {}", data_about_bot.user.name);
        let state = data.lifecycle.on_ready(&data.platform).await;
        debug!("Ready handled, session is {:?}", state);
    }

    Ok(())
}

/// Framework-wide command check: keeps every command inside the bot channel.
pub async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let notifier = ReplyNotifier(ctx);
    Ok(ctx.data().gate.authorize(ctx.channel_id(), &notifier).await)
}
