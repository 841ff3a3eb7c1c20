use std::collections::BTreeMap;

use serde_json::{Map, Value};
use serenity::all::GuildId;

use crate::{gateway::RemoteCommand, reconcile::normalize::differing_keys};

/// A locally registered application command with its creatable attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCommand {
    pub name: String,
    pub guild_id: Option<GuildId>,
    pub attributes: Map<String, Value>,
}

/// A command present on both sides whose attributes differ.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandUpdate {
    pub local: LocalCommand,
    pub remote: RemoteCommand,
    pub changed: Vec<String>,
}

impl CommandUpdate {
    /// Whether the command moves between global and guild scope, or between guilds.
    pub fn scope_changed(&self) -> bool {
        self.local.guild_id != self.remote.guild_id
    }
}

/// Mutations needed to make the remote registry match the local one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub created: Vec<LocalCommand>,
    pub updated: Vec<CommandUpdate>,
    pub deleted: Vec<RemoteCommand>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    pub fn created_names(&self) -> Vec<&str> {
        self.created.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn updated_names(&self) -> Vec<&str> {
        self.updated.iter().map(|u| u.local.name.as_str()).collect()
    }

    pub fn deleted_names(&self) -> Vec<&str> {
        self.deleted.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Diffs local declarations against the remote registry, both keyed by name.
///
/// # Returns
/// - `ReconcilePlan` - Created: local only. Deleted: remote only. Updated: on both
///   sides with at least one differing normalized attribute
pub fn plan(
    local: &BTreeMap<String, LocalCommand>,
    remote: &BTreeMap<String, RemoteCommand>,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    for (name, command) in local {
        match remote.get(name) {
            None => plan.created.push(command.clone()),
            Some(existing) => {
                let changed = differing_keys(&command.attributes, &existing.attributes);
                if !changed.is_empty() {
                    plan.updated.push(CommandUpdate {
                        local: command.clone(),
                        remote: existing.clone(),
                        changed,
                    });
                }
            }
        }
    }

    plan.deleted = remote
        .iter()
        .filter(|(name, _)| !local.contains_key(*name))
        .map(|(_, command)| command.clone())
        .collect();

    plan
}
