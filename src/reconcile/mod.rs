//! Reconciliation of local application commands against Discord's registry.
//!
//! A pass fetches every remote command (global scope plus every known guild, fetched
//! concurrently), diffs them by name against the local registry and applies updates,
//! then deletions, then creations. A command that changes scope is deleted from its
//! old scope before it is created in the new one.

pub mod normalize;
pub mod plan;

#[cfg(test)]
mod test;

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serenity::all::{CommandId, GuildId};
use tracing::{error, info, warn};

use crate::{
    command::CommandRegistry,
    error::{BotError, Result},
    gateway::{CommandGateway, CommandScope, RemoteCommand},
};

pub use plan::{plan, CommandUpdate, LocalCommand, ReconcilePlan};

/// Outcome of applying a plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    /// Mutations that were reported and skipped.
    pub failed: Vec<String>,
}

pub struct Reconciler {
    gateway: Arc<dyn CommandGateway>,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn CommandGateway>) -> Self {
        Self { gateway }
    }

    /// Creatable attributes of every enabled application command, keyed by name.
    ///
    /// # Returns
    /// - `Ok(BTreeMap)` - Local commands
    /// - `Err(BotError::JsonErr)` - A definition failed to serialize
    pub fn local_commands(registry: &CommandRegistry) -> Result<BTreeMap<String, LocalCommand>> {
        let mut local = BTreeMap::new();

        for registered in registry.application_commands() {
            if !registered.command.enabled() {
                continue;
            }
            let definition = &registered.definition;
            local.insert(
                definition.name.clone(),
                LocalCommand {
                    name: definition.name.clone(),
                    guild_id: definition.guild_id,
                    attributes: definition.creatable_attributes()?,
                },
            );
        }

        Ok(local)
    }

    /// Fetches global and per-guild commands concurrently and flattens them by name.
    ///
    /// # Returns
    /// - `Ok(BTreeMap)` - Remote commands keyed by name
    /// - `Err(BotError)` - Any single fetch failed
    pub async fn fetch_remote(&self) -> Result<BTreeMap<String, RemoteCommand>> {
        let scopes: Vec<CommandScope> = std::iter::once(CommandScope::Global)
            .chain(
                self.gateway
                    .known_guilds()
                    .await
                    .into_iter()
                    .map(CommandScope::Guild),
            )
            .collect();

        let fetched = try_join_all(
            scopes
                .iter()
                .map(|scope| self.gateway.fetch_commands(*scope)),
        )
        .await?;

        Ok(fetched
            .into_iter()
            .flatten()
            .filter(|command| !command.name.is_empty())
            .map(|command| (command.name.clone(), command))
            .collect())
    }

    /// Runs a full pass against a snapshot of local commands.
    ///
    /// # Returns
    /// - `Ok(ReconcileReport)` - Pass completed; individual mutation failures are in
    ///   `failed`
    /// - `Err(BotError)` - The remote fetch failed, the pass was not attempted
    pub async fn reconcile(
        &self,
        local: &BTreeMap<String, LocalCommand>,
    ) -> Result<ReconcileReport> {
        let remote = self.fetch_remote().await?;
        let plan = plan(local, &remote);

        Ok(self.apply(plan).await)
    }

    /// Applies updates, then deletions, then creations. Failures are logged and skipped.
    pub async fn apply(&self, plan: ReconcilePlan) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if !plan.updated.is_empty() {
            info!("Updating {} application command(s)", plan.updated.len());
        }
        for update in &plan.updated {
            if update.scope_changed() {
                if let Err(e) = self
                    .unregister_remote(update.remote.id, update.remote.guild_id)
                    .await
                {
                    report_failure(&mut report, &update.remote.name, "unregister", &e);
                    continue;
                }
            }
            match self.register_remote(&update.local).await {
                Ok(_) => report.updated.push(update.local.name.clone()),
                Err(e) => report_failure(&mut report, &update.local.name, "update", &e),
            }
        }

        if !plan.deleted.is_empty() {
            info!("Deleting {} application command(s)", plan.deleted.len());
        }
        for remote in &plan.deleted {
            match self.unregister_remote(remote.id, remote.guild_id).await {
                Ok(()) => report.deleted.push(remote.name.clone()),
                Err(e) => report_failure(&mut report, &remote.name, "delete", &e),
            }
        }

        if !plan.created.is_empty() {
            info!("Creating {} application command(s)", plan.created.len());
        }
        for local in &plan.created {
            match self.register_remote(local).await {
                Ok(_) => report.created.push(local.name.clone()),
                Err(e) => report_failure(&mut report, &local.name, "create", &e),
            }
        }

        report
    }

    /// Upserts a command under its declared scope.
    ///
    /// # Returns
    /// - `Ok(RemoteCommand)` - The command as stored remotely
    /// - `Err(BotError::GuildNotFound)` - The declared guild is not visible to the bot
    /// - `Err(BotError::DiscordErr)` - The request failed
    pub async fn register_remote(&self, command: &LocalCommand) -> Result<RemoteCommand> {
        let scope = self.resolve_scope(command.guild_id).await?;
        self.gateway.upsert_command(scope, &command.attributes).await
    }

    /// Deletes a command by id from the given scope.
    ///
    /// # Returns
    /// - `Ok(())` - Deleted
    /// - `Err(BotError::GuildNotFound)` - The guild is not visible to the bot
    /// - `Err(BotError::DiscordErr)` - The request failed
    pub async fn unregister_remote(&self, id: CommandId, guild_id: Option<GuildId>) -> Result<()> {
        let scope = self.resolve_scope(guild_id).await?;
        self.gateway.delete_command(scope, id).await
    }

    async fn resolve_scope(&self, guild_id: Option<GuildId>) -> Result<CommandScope> {
        if let Some(guild_id) = guild_id {
            if !self.gateway.has_guild(guild_id).await {
                return Err(BotError::GuildNotFound(guild_id));
            }
        }

        Ok(CommandScope::from_guild(guild_id))
    }
}

fn report_failure(report: &mut ReconcileReport, name: &str, action: &str, e: &BotError) {
    match e {
        BotError::GuildNotFound(guild_id) => {
            warn!("Skipping {} of '{}': guild {} not found", action, name, guild_id)
        }
        e => error!("Failed to {} application command '{}': {}", action, name, e),
    }
    report.failed.push(name.to_string());
}
