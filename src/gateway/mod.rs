//! Narrow capabilities consumed from the Discord client.
//!
//! The reconciliation engine talks to Discord's application command registry through
//! `CommandGateway`, and dispatch sends replies through `Responder`. Serenity backed
//! implementations live in `discord`; tests use the in-memory fakes in `fake`.

pub mod discord;

#[cfg(test)]
pub mod fake;

use std::fmt;

use serde_json::{Map, Value};
use serenity::{
    all::{CommandId, GuildId},
    async_trait,
};

use crate::{
    error::Result,
    model::{Reply, Source},
};

pub use discord::{GuildSet, SerenityGateway, SerenityResponder};

/// Attribute keys Discord accepts when creating a command. Everything else a fetched
/// command carries (ids, versions, application ids) is server managed.
pub const CREATABLE_KEYS: [&str; 10] = [
    "type",
    "name",
    "name_localizations",
    "description",
    "description_localizations",
    "options",
    "dm_permission",
    "nsfw",
    "default_member_permissions",
    "guild_id",
];

/// Where an application command is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandScope {
    Global,
    Guild(GuildId),
}

impl CommandScope {
    pub fn from_guild(guild_id: Option<GuildId>) -> Self {
        match guild_id {
            Some(guild_id) => Self::Guild(guild_id),
            None => Self::Global,
        }
    }

    pub fn guild_id(self) -> Option<GuildId> {
        match self {
            Self::Global => None,
            Self::Guild(guild_id) => Some(guild_id),
        }
    }
}

impl fmt::Display for CommandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Guild(guild_id) => write!(f, "guild {guild_id}"),
        }
    }
}

/// Discord's view of a previously registered application command.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCommand {
    pub id: CommandId,
    pub name: String,
    /// `None` for global commands.
    pub guild_id: Option<GuildId>,
    /// Creatable attributes only, with `guild_id` set from the scope it was fetched from.
    pub attributes: Map<String, Value>,
}

impl RemoteCommand {
    /// Builds a remote record from raw command JSON fetched under `scope`.
    ///
    /// Server managed keys are dropped. Guild commands never carry `dm_permission`,
    /// which Discord only honours for global commands.
    ///
    /// # Returns
    /// - `Some(RemoteCommand)` - The JSON carries a non-empty name
    /// - `None` - The name is missing or empty
    pub fn from_attributes(
        id: CommandId,
        scope: CommandScope,
        raw: &Map<String, Value>,
    ) -> Option<Self> {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())?
            .to_string();

        let mut attributes: Map<String, Value> = raw
            .iter()
            .filter(|(key, _)| CREATABLE_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        match scope {
            CommandScope::Global => {
                attributes.insert("guild_id".to_string(), Value::Null);
            }
            CommandScope::Guild(guild_id) => {
                attributes.insert("guild_id".to_string(), Value::String(guild_id.to_string()));
                attributes.remove("dm_permission");
            }
        }

        Some(Self {
            id,
            name,
            guild_id: scope.guild_id(),
            attributes,
        })
    }

    pub fn scope(&self) -> CommandScope {
        CommandScope::from_guild(self.guild_id)
    }
}

/// Application command registry operations, global and per guild.
#[async_trait]
pub trait CommandGateway: Send + Sync {
    /// Guilds currently visible to the bot.
    async fn known_guilds(&self) -> Vec<GuildId>;

    async fn has_guild(&self, guild_id: GuildId) -> bool;

    /// Lists every command registered under `scope`.
    async fn fetch_commands(&self, scope: CommandScope) -> Result<Vec<RemoteCommand>>;

    /// Creates or overwrites the command with the same name under `scope`.
    ///
    /// `attributes` may carry `guild_id`; implementations derive the target from `scope`
    /// and never send it in the request body.
    async fn upsert_command(
        &self,
        scope: CommandScope,
        attributes: &Map<String, Value>,
    ) -> Result<RemoteCommand>;

    async fn delete_command(&self, scope: CommandScope, id: CommandId) -> Result<()>;
}

/// Sends replies back to the source of a dispatch.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, source: &Source, reply: Reply) -> Result<()>;
}

/// Strips `guild_id`, which Discord reads from the route rather than the body.
pub(crate) fn request_body(attributes: &Map<String, Value>) -> Map<String, Value> {
    attributes
        .iter()
        .filter(|(key, _)| key.as_str() != "guild_id")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
