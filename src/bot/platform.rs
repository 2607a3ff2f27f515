//! The chat platform as seen by the lifecycle controller: command groups,
//! application flags and the guild command tree.

use dashmap::DashMap;
use serenity::all::{ApplicationFlags, CreateCommand, Http};
use serenity::async_trait;
use serenity::model::id::GuildId;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::Data;

/// Failures talking to the chat platform during lifecycle transitions.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Discord API error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("Discord rejected the request: {0}")]
    Rejected(String),
}

/// A named bundle of related application commands, registered together.
#[derive(Debug, Clone)]
pub struct CommandGroup {
    name: String,
    commands: Vec<CreateCommand>,
}

impl CommandGroup {
    pub fn new(name: impl Into<String>, commands: Vec<CreateCommand>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    /// Builds the application command definitions for a set of poise commands.
    pub fn from_commands(
        name: impl Into<String>,
        commands: &[poise::Command<Data, crate::Error>],
    ) -> Self {
        Self::new(name, poise::builtins::create_application_commands(commands))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[CreateCommand] {
        &self.commands
    }
}

/// Access level the application has to a privileged gateway intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentAccess {
    /// Approved for a verified application.
    Enabled,
    /// Switched on in the developer portal for an unverified application.
    Limited,
    Disabled,
}

impl IntentAccess {
    fn from_flags(flags: ApplicationFlags, full: ApplicationFlags, limited: ApplicationFlags) -> Self {
        if flags.contains(full) {
            IntentAccess::Enabled
        } else if flags.contains(limited) {
            IntentAccess::Limited
        } else {
            IntentAccess::Disabled
        }
    }
}

/// The privileged intents this bot relies on, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationConfiguration {
    pub message_content: IntentAccess,
    pub guild_members: IntentAccess,
}

impl ApplicationConfiguration {
    pub fn from_flags(flags: ApplicationFlags) -> Self {
        Self {
            message_content: IntentAccess::from_flags(
                flags,
                ApplicationFlags::GATEWAY_MESSAGE_CONTENT,
                ApplicationFlags::GATEWAY_MESSAGE_CONTENT_LIMITED,
            ),
            guild_members: IntentAccess::from_flags(
                flags,
                ApplicationFlags::GATEWAY_GUILD_MEMBERS,
                ApplicationFlags::GATEWAY_GUILD_MEMBERS_LIMITED,
            ),
        }
    }

    /// Intents that are not fully enabled, by name.
    pub fn restricted_intents(&self) -> Vec<(&'static str, IntentAccess)> {
        [
            ("message content", self.message_content),
            ("guild members", self.guild_members),
        ]
        .into_iter()
        .filter(|(_, access)| *access != IntentAccess::Enabled)
        .collect()
    }
}

/// Operations the lifecycle controller needs from the chat platform.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Reads the application's privileged intent flags.
    async fn application_configuration(&self) -> Result<ApplicationConfiguration, PlatformError>;

    /// Adds a command group to the local command tree of `guild_id`.
    /// This tree is what `sync_command_tree` pushes; dispatch does not read it.
    async fn register_command_group(
        &self,
        group: &CommandGroup,
        guild_id: GuildId,
    ) -> Result<(), PlatformError>;

    /// Pushes the local command tree of `guild_id` to the platform.
    async fn sync_command_tree(&self, guild_id: GuildId) -> Result<(), PlatformError>;
}

/// Serenity-backed platform keeping a local command tree per guild.
pub struct SerenityPlatform {
    http: Arc<Http>,
    tree: DashMap<GuildId, Vec<CommandGroup>>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            tree: DashMap::new(),
        }
    }

    /// Names of the groups registered for `guild_id`, in registration order.
    pub fn registered_groups(&self, guild_id: GuildId) -> Vec<String> {
        self.tree
            .get(&guild_id)
            .map(|groups| groups.iter().map(|g| g.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn application_configuration(&self) -> Result<ApplicationConfiguration, PlatformError> {
        let info = self.http.get_current_application_info().await?;
        Ok(ApplicationConfiguration::from_flags(info.flags.unwrap_or_else(ApplicationFlags::empty)))
    }

    async fn register_command_group(
        &self,
        group: &CommandGroup,
        guild_id: GuildId,
    ) -> Result<(), PlatformError> {
        let mut groups = self.tree.entry(guild_id).or_default();

        // Re-registering a group replaces it in place
        match groups.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => *existing = group.clone(),
            None => groups.push(group.clone()),
        }

        debug!(
            "Registered command group '{}' ({} commands) for guild {}",
            group.name,
            group.commands.len(),
            guild_id
        );
        Ok(())
    }

    async fn sync_command_tree(&self, guild_id: GuildId) -> Result<(), PlatformError> {
        // Clone out of the map so no shard lock is held across the request.
        let commands: Vec<CreateCommand> = self
            .tree
            .get(&guild_id)
            .map(|groups| {
                groups
                    .iter()
                    .flat_map(|g| g.commands.iter().cloned())
                    .collect()
            })
            .unwrap_or_default();

        let count = commands.len();
        let synced = guild_id.set_commands(&self.http, commands).await?;
        info!(
            "Synced {} commands to guild {} ({} acknowledged)",
            count,
            guild_id,
            synced.len()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_limited_intents_are_reported() {
        let config = ApplicationConfiguration::from_flags(
            ApplicationFlags::GATEWAY_MESSAGE_CONTENT_LIMITED
                | ApplicationFlags::GATEWAY_GUILD_MEMBERS_LIMITED,
        );

        assert_eq!(config.message_content, IntentAccess::Limited);
        assert_eq!(config.guild_members, IntentAccess::Limited);
        assert_eq!(
            config.restricted_intents(),
            vec![
                ("message content", IntentAccess::Limited),
                ("guild members", IntentAccess::Limited)
            ]
        );
    }

    #[test]
    fn test_fully_enabled_intents_are_not_reported() {
        let config = ApplicationConfiguration::from_flags(
            ApplicationFlags::GATEWAY_MESSAGE_CONTENT | ApplicationFlags::GATEWAY_GUILD_MEMBERS,
        );

        assert!(config.restricted_intents().is_empty());
    }

    #[test]
    fn test_missing_flags_are_disabled() {
        let config = ApplicationConfiguration::from_flags(ApplicationFlags::GATEWAY_GUILD_MEMBERS);

        assert_eq!(config.guild_members, IntentAccess::Enabled);
        assert_eq!(
            config.restricted_intents(),
            vec![("message content", IntentAccess::Disabled)]
        );
    }

    #[tokio::test]
    async fn test_registering_a_group_twice_replaces_it() {
        let platform = SerenityPlatform::new(Arc::new(Http::new("")));
        let guild = GuildId::new(42);
        let general = CommandGroup::new(
            "general",
            vec![CreateCommand::new("ping").description("Ping")],
        );
        let music = CommandGroup::new(
            "music",
            vec![CreateCommand::new("resolve").description("Resolve")],
        );

        platform.register_command_group(&general, guild).await.unwrap();
        platform.register_command_group(&music, guild).await.unwrap();
        platform.register_command_group(&general, guild).await.unwrap();

        assert_eq!(platform.registered_groups(guild), vec!["general", "music"]);
        assert!(platform.registered_groups(GuildId::new(7)).is_empty());
    }
}
