//! The bot session and the state machine driven by gateway "ready" events.
//!
//! Ready fires on the first connection and again after reconnects. The session
//! registers its command groups once, checks the application's privileged
//! intents every time, and pushes the guild command tree once when syncing is
//! enabled. A failed transition leaves the state untouched so the next ready
//! event retries it.

use serenity::model::id::GuildId;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::platform::{ChatPlatform, CommandGroup, IntentAccess, PlatformError};

/// Progress of the session. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Uninitialized,
    CommandsRegistered,
    Synced,
}

/// Process-wide session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSession {
    state: LifecycleState,
    guild_id: GuildId,
}

impl BotSession {
    fn new(guild_id: GuildId) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            guild_id,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn is_commands_registered(&self) -> bool {
        self.state >= LifecycleState::CommandsRegistered
    }

    pub fn is_tree_synced(&self) -> bool {
        self.state == LifecycleState::Synced
    }
}

/// Owns the session and runs its transitions.
///
/// Build exactly one per process and share it by handle.
pub struct BotLifecycleController {
    session: Mutex<BotSession>,
    command_groups: Vec<CommandGroup>,
    should_sync: bool,
}

impl BotLifecycleController {
    pub fn new(guild_id: GuildId, should_sync: bool, command_groups: Vec<CommandGroup>) -> Self {
        Self {
            session: Mutex::new(BotSession::new(guild_id)),
            command_groups,
            should_sync,
        }
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> BotSession {
        self.session.lock().await.clone()
    }

    /// Handles a ready event and returns the resulting state.
    ///
    /// The session lock is held for the whole call, so overlapping ready
    /// events are processed one after the other.
    pub async fn on_ready<P>(&self, platform: &P) -> LifecycleState
    where
        P: ChatPlatform + ?Sized,
    {
        let mut session = self.session.lock().await;

        if session.state == LifecycleState::Uninitialized {
            match self.register_command_groups(platform, session.guild_id).await {
                Ok(()) => session.state = LifecycleState::CommandsRegistered,
                Err(e) => error!("Failed to register command groups: {}", e),
            }
        }

        self.ensure_application_configuration(platform).await;

        if self.should_sync && session.state == LifecycleState::CommandsRegistered {
            info!("Syncing commands");
            match platform.sync_command_tree(session.guild_id).await {
                Ok(()) => session.state = LifecycleState::Synced,
                Err(e) => error!("Failed to sync command tree: {}", e),
            }
        }

        debug!("#####################");
        debug!("Cool Kids / Bot Ready ({:?})", session.state);
        debug!("#####################");

        session.state
    }

    async fn register_command_groups<P>(
        &self,
        platform: &P,
        guild_id: GuildId,
    ) -> Result<(), PlatformError>
    where
        P: ChatPlatform + ?Sized,
    {
        for group in &self.command_groups {
            platform.register_command_group(group, guild_id).await?;
        }

        info!(
            "Registered {} command groups for guild {}",
            self.command_groups.len(),
            guild_id
        );
        Ok(())
    }

    /// Logs every privileged intent the application is missing. Advisory only.
    async fn ensure_application_configuration<P>(&self, platform: &P)
    where
        P: ChatPlatform + ?Sized,
    {
        let configuration = match platform.application_configuration().await {
            Ok(configuration) => configuration,
            Err(e) => {
                warn!("Could not verify application configuration: {}", e);
                return;
            }
        };

        for (intent, access) in configuration.restricted_intents() {
            match access {
                IntentAccess::Disabled => {
                    error!("Discord App not configured for {} intent", intent)
                }
                _ => warn!("Discord App has limited access to the {} intent", intent),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::platform::{ApplicationConfiguration, MockChatPlatform};
    use mockall::Sequence;
    use pretty_assertions::assert_eq;
    use serenity::all::CreateCommand;

    fn guild() -> GuildId {
        GuildId::new(123456789)
    }

    fn groups() -> Vec<CommandGroup> {
        vec![
            CommandGroup::new("general", vec![CreateCommand::new("ping").description("Ping")]),
            CommandGroup::new("music", vec![CreateCommand::new("resolve").description("Resolve")]),
        ]
    }

    fn enabled() -> ApplicationConfiguration {
        ApplicationConfiguration {
            message_content: IntentAccess::Enabled,
            guild_members: IntentAccess::Enabled,
        }
    }

    fn platform_with_configuration() -> MockChatPlatform {
        let mut platform = MockChatPlatform::new();
        platform
            .expect_application_configuration()
            .returning(|| Ok(enabled()));
        platform
    }

    #[tokio::test]
    async fn test_repeated_ready_registers_and_syncs_once() {
        let mut platform = platform_with_configuration();
        platform
            .expect_register_command_group()
            .withf(|_, guild_id| *guild_id == guild())
            .times(2)
            .returning(|_, _| Ok(()));
        platform
            .expect_sync_command_tree()
            .withf(|guild_id| *guild_id == guild())
            .times(1)
            .returning(|_| Ok(()));

        let controller = BotLifecycleController::new(guild(), true, groups());

        assert_eq!(controller.on_ready(&platform).await, LifecycleState::Synced);
        assert_eq!(controller.on_ready(&platform).await, LifecycleState::Synced);

        let session = controller.session().await;
        assert!(session.is_commands_registered());
        assert!(session.is_tree_synced());
        assert_eq!(session.guild_id(), guild());
    }

    #[tokio::test]
    async fn test_sync_disabled_stays_registered() {
        let mut platform = platform_with_configuration();
        platform
            .expect_register_command_group()
            .times(2)
            .returning(|_, _| Ok(()));
        platform.expect_sync_command_tree().never();

        let controller = BotLifecycleController::new(guild(), false, groups());

        for _ in 0..3 {
            assert_eq!(
                controller.on_ready(&platform).await,
                LifecycleState::CommandsRegistered
            );
        }

        let session = controller.session().await;
        assert!(session.is_commands_registered());
        assert!(!session.is_tree_synced());
    }

    #[tokio::test]
    async fn test_failed_registration_is_retried_on_next_ready() {
        let mut seq = Sequence::new();
        let mut platform = platform_with_configuration();
        platform
            .expect_register_command_group()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(PlatformError::Rejected("missing access".into())));
        platform
            .expect_register_command_group()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        platform
            .expect_sync_command_tree()
            .times(1)
            .returning(|_| Ok(()));

        let controller = BotLifecycleController::new(guild(), true, groups());

        assert_eq!(
            controller.on_ready(&platform).await,
            LifecycleState::Uninitialized
        );
        assert_eq!(controller.on_ready(&platform).await, LifecycleState::Synced);
    }

    #[tokio::test]
    async fn test_failed_sync_keeps_registration_and_retries() {
        let mut seq = Sequence::new();
        let mut platform = platform_with_configuration();
        platform
            .expect_register_command_group()
            .times(2)
            .returning(|_, _| Ok(()));
        platform
            .expect_sync_command_tree()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(PlatformError::Rejected("rate limited".into())));
        platform
            .expect_sync_command_tree()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let controller = BotLifecycleController::new(guild(), true, groups());

        assert_eq!(
            controller.on_ready(&platform).await,
            LifecycleState::CommandsRegistered
        );
        assert_eq!(controller.on_ready(&platform).await, LifecycleState::Synced);
    }

    #[tokio::test]
    async fn test_configuration_problems_do_not_block_startup() {
        let mut platform = MockChatPlatform::new();
        platform
            .expect_application_configuration()
            .times(1)
            .returning(|| {
                Ok(ApplicationConfiguration {
                    message_content: IntentAccess::Disabled,
                    guild_members: IntentAccess::Limited,
                })
            });
        platform
            .expect_register_command_group()
            .times(2)
            .returning(|_, _| Ok(()));
        platform
            .expect_sync_command_tree()
            .times(1)
            .returning(|_| Ok(()));

        let controller = BotLifecycleController::new(guild(), true, groups());

        assert_eq!(controller.on_ready(&platform).await, LifecycleState::Synced);
    }

    #[tokio::test]
    async fn test_configuration_lookup_failure_is_ignored() {
        let mut platform = MockChatPlatform::new();
        platform
            .expect_application_configuration()
            .times(2)
            .returning(|| Err(PlatformError::Rejected("unauthorized".into())));
        platform
            .expect_register_command_group()
            .times(2)
            .returning(|_, _| Ok(()));
        platform.expect_sync_command_tree().never();

        let controller = BotLifecycleController::new(guild(), false, groups());

        controller.on_ready(&platform).await;
        assert_eq!(
            controller.on_ready(&platform).await,
            LifecycleState::CommandsRegistered
        );
    }

    #[tokio::test]
    async fn test_fresh_session_is_uninitialized() {
        let controller = BotLifecycleController::new(guild(), true, groups());
        let session = controller.session().await;

        assert_eq!(session.state(), LifecycleState::Uninitialized);
        assert!(!session.is_commands_registered());
        assert!(!session.is_tree_synced());
    }
}
