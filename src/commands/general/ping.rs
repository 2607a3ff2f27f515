use ::serenity::all::CreateEmbed;
use poise::{CreateReply, serenity_prelude as serenity};
use std::time::Duration;

use super::*;

/// Ping the bot to check its gateway latency
#[poise::command(slash_command, category = "General")]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    let latency = get_shard_latency(&ctx).await;

    let embed = CreateEmbed::new()
        .title("Pong!")
        .field("Gateway Latency", format_latency(latency), false);

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

async fn get_shard_latency(ctx: &Context<'_>) -> Option<Duration> {
    let shard_manager = ctx.framework().shard_manager();
    let runners = shard_manager.runners.lock().await;

    // Latency is tracked per shard runner; use the one this command came in on.
    let runner = runners.get(&serenity::ShardId(ctx.serenity_context().shard_id.0))?;

    runner.latency
}

/// Latency is unknown until the first heartbeat is acknowledged.
fn format_latency(latency: Option<Duration>) -> String {
    match latency {
        Some(latency) => format!("{} ms", latency.as_millis()),
        None => "measuring…".to_string(),
    }
}
