//! Restricts command execution to the designated bot channel.

use poise::CreateReply;
use serenity::async_trait;
use serenity::model::id::ChannelId;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use crate::{Context, Error};

/// Notice shown to users who run a command outside the bot channel.
pub const WRONG_CHANNEL_NOTICE: &str = "Please enter command in bot channel";

/// Sends the user-visible notice when a command is turned away.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GateNotifier: Send + Sync {
    async fn send_notice(&self, content: &str) -> Result<(), Error>;
}

/// Replies ephemerally to the invoking interaction.
pub struct ReplyNotifier<'a>(pub Context<'a>);

#[async_trait]
impl GateNotifier for ReplyNotifier<'_> {
    async fn send_notice(&self, content: &str) -> Result<(), Error> {
        self.0
            .send(CreateReply::default().content(content).ephemeral(true))
            .await?;
        Ok(())
    }
}

/// Only allows commands invoked from a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelGatePolicy {
    allowed_channel_id: ChannelId,
}

impl ChannelGatePolicy {
    pub fn new(allowed_channel_id: ChannelId) -> Self {
        Self { allowed_channel_id }
    }

    pub fn allowed_channel_id(&self) -> ChannelId {
        self.allowed_channel_id
    }

    /// Decides whether a command invoked in `channel_id` may run.
    ///
    /// A rejection sends exactly one notice through `notifier`. The command
    /// stays rejected even if that notice cannot be delivered.
    pub async fn authorize<N>(&self, channel_id: ChannelId, notifier: &N) -> bool
    where
        N: GateNotifier + ?Sized,
    {
        if channel_id == self.allowed_channel_id {
            return true;
        }

        debug!(
            "Rejected command from channel {} (allowed: {})",
            channel_id, self.allowed_channel_id
        );
        if let Err(e) = notifier.send_notice(WRONG_CHANNEL_NOTICE).await {
            warn!("Failed to send wrong-channel notice: {}", e);
        }

        false
    }
}
