//! Command capabilities and the in-memory command registry.
//!
//! Chat commands are parsed from message text behind a configured prefix. Application
//! commands (slash commands and context menus) are declared through a
//! `CommandDefinition` and registered with Discord during reconciliation.

pub mod chat;
pub mod discover;
pub mod registry;

#[cfg(test)]
mod test;

use serenity::async_trait;

use crate::{
    error::Result,
    middleware::{DispatchContext, MiddlewareSpec},
    model::CommandDefinition,
    router::InteractionRoute,
};

pub use chat::{parse, strip_prefix, ParsedCommand};
pub use discover::{CatalogItem, CommandCatalog};
pub use registry::{CommandRegistry, RegisteredCommand};

/// A prefix command parsed from chat messages.
#[async_trait]
pub trait ChatCommand: Send + Sync {
    fn name(&self) -> &str;

    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    fn description(&self) -> &str {
        ""
    }

    /// Argument synopsis shown by help output, e.g. `<user> [reason]`.
    fn usage(&self) -> Option<&str> {
        None
    }

    fn admin_only(&self) -> bool {
        false
    }

    /// Disabled commands are never registered.
    fn enabled(&self) -> bool {
        true
    }

    /// Registry key. Registering another value with the same identity replaces it.
    fn identity(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Component and modal routes owned by this command, registered as `{name}@{key}`.
    fn interactions(&self) -> Vec<InteractionRoute> {
        Vec::new()
    }

    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()>;
}

/// A slash command or context menu.
#[async_trait]
pub trait ApplicationCommand: Send + Sync {
    fn definition(&self) -> CommandDefinition;

    fn admin_only(&self) -> bool {
        false
    }

    fn enabled(&self) -> bool {
        true
    }

    fn identity(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Middleware applied after the global chain for every route of this command.
    fn middleware(&self) -> Vec<MiddlewareSpec> {
        Vec::new()
    }

    fn interactions(&self) -> Vec<InteractionRoute> {
        Vec::new()
    }

    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()>;

    async fn autocomplete(&self, _ctx: &mut DispatchContext) -> Result<()> {
        Ok(())
    }
}
