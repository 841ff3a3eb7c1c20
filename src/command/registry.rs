use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    command::{ApplicationCommand, ChatCommand},
    error::definition::DefinitionError,
    model::{CommandDefinition, CommandKind},
    router::{AutocompleteHandler, CommandHandler, InteractionRoute, RouteHandler},
};

/// An application command with the definition captured at registration.
#[derive(Clone)]
pub struct RegisteredCommand {
    pub command: Arc<dyn ApplicationCommand>,
    pub definition: CommandDefinition,
}

impl RegisteredCommand {
    /// Dispatch routes for the command: its name, every leaf sub-command path and its
    /// own interaction routes under `{name}@`.
    pub fn routes(&self) -> Vec<InteractionRoute> {
        let name = &self.definition.name;
        let handler: Arc<dyn RouteHandler> = Arc::new(CommandHandler(self.command.clone()));
        let autocomplete: Arc<dyn RouteHandler> =
            Arc::new(AutocompleteHandler(self.command.clone()));
        let middleware = self.command.middleware();
        let admin_only = self.command.admin_only();

        let entry = |key: String, handler: Arc<dyn RouteHandler>| InteractionRoute {
            key,
            handler,
            autocomplete: Some(autocomplete.clone()),
            middleware: middleware.clone(),
            admin_only,
        };

        let mut routes = vec![entry(name.clone(), handler.clone())];
        for (path, leaf) in self.definition.leaf_paths() {
            routes.push(entry(path, leaf.unwrap_or_else(|| handler.clone())));
        }
        routes.extend(
            self.command
                .interactions()
                .into_iter()
                .map(|route| route.namespaced(name)),
        );

        routes
    }
}

/// Chat commands, slash commands and context menus indexed by identity and by name.
///
/// Name indexes map primary names and aliases to identities. A name claimed by a later
/// registration is moved to it, and a command that loses its primary name this way is
/// dropped.
#[derive(Default)]
pub struct CommandRegistry {
    chat: BTreeMap<String, Arc<dyn ChatCommand>>,
    chat_names: HashMap<String, String>,
    slash: BTreeMap<String, RegisteredCommand>,
    slash_names: HashMap<String, String>,
    context_menus: BTreeMap<String, RegisteredCommand>,
    context_menu_names: HashMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chat command.
    ///
    /// # Returns
    /// - `Ok(routes)` - The command's interaction routes namespaced as `{name}@{key}`, to
    ///   be added to the router. Empty when the command is disabled
    /// - `Err(DefinitionError::InvalidDefinition)` - Name or an alias is empty or
    ///   contains whitespace
    pub fn register_chat(
        &mut self,
        command: Arc<dyn ChatCommand>,
    ) -> Result<Vec<InteractionRoute>, DefinitionError> {
        let name = command.name().to_string();
        let aliases = command.aliases();

        if let Some(bad) = std::iter::once(&name)
            .chain(aliases.iter())
            .find(|n| n.is_empty() || n.chars().any(char::is_whitespace))
        {
            return Err(DefinitionError::invalid_definition(
                &name,
                format!("'{bad}' is not a valid chat command name"),
            ));
        }

        if !command.enabled() {
            debug!("Skipping disabled chat command '{}'", name);
            return Ok(Vec::new());
        }

        let identity = command.identity().to_string();
        forget_names(&mut self.chat_names, &identity);
        let displaced: Vec<String> = std::iter::once(name.clone())
            .chain(aliases)
            .filter_map(|key| claim_name(&mut self.chat_names, key, &identity))
            .collect();

        for previous in displaced {
            let keeps_name = self
                .chat
                .get(&previous)
                .is_some_and(|other| self.chat_names.get(other.name()) == Some(&previous));
            if !keeps_name {
                debug!("Dropping chat command {} shadowed by {}", previous, identity);
                self.chat.remove(&previous);
                forget_names(&mut self.chat_names, &previous);
            }
        }

        let routes = command
            .interactions()
            .into_iter()
            .map(|route| route.namespaced(&name))
            .collect();
        self.chat.insert(identity, command);

        Ok(routes)
    }

    /// Registers a slash command. Disabled commands are skipped.
    ///
    /// # Returns
    /// - `Ok(())` - Registered or skipped
    /// - `Err(DefinitionError::InvalidDefinition)` - The definition is not a slash
    ///   command or violates Discord's constraints
    pub fn register_slash(
        &mut self,
        command: Arc<dyn ApplicationCommand>,
    ) -> Result<(), DefinitionError> {
        self.register_application(command, CommandKind::SlashCommand)
    }

    /// Registers a context menu. Disabled context menus are skipped.
    pub fn register_context_menu(
        &mut self,
        command: Arc<dyn ApplicationCommand>,
    ) -> Result<(), DefinitionError> {
        self.register_application(command, CommandKind::ContextMenu)
    }

    fn register_application(
        &mut self,
        command: Arc<dyn ApplicationCommand>,
        kind: CommandKind,
    ) -> Result<(), DefinitionError> {
        let definition = command.definition();

        if definition.kind != kind {
            return Err(DefinitionError::invalid_definition(
                &definition.name,
                format!("expected a {kind:?}, got a {:?}", definition.kind),
            ));
        }
        definition.validate()?;

        if !command.enabled() {
            debug!("Skipping disabled application command '{}'", definition.name);
            return Ok(());
        }

        let (commands, names) = match kind {
            CommandKind::ContextMenu => (&mut self.context_menus, &mut self.context_menu_names),
            _ => (&mut self.slash, &mut self.slash_names),
        };

        let identity = command.identity().to_string();
        forget_names(names, &identity);
        if let Some(previous) = claim_name(names, definition.name.clone(), &identity) {
            commands.remove(&previous);
        }
        commands.insert(
            identity,
            RegisteredCommand {
                command,
                definition,
            },
        );

        Ok(())
    }

    /// Chat command for a primary name or alias. Matching is case sensitive.
    pub fn lookup_chat(&self, name: &str) -> Option<Arc<dyn ChatCommand>> {
        self.chat_names
            .get(name)
            .and_then(|identity| self.chat.get(identity))
            .cloned()
    }

    /// Slash command or context menu by name. Slash commands are searched first.
    pub fn lookup_application(&self, name: &str) -> Option<&RegisteredCommand> {
        self.slash_names
            .get(name)
            .and_then(|identity| self.slash.get(identity))
            .or_else(|| {
                self.context_menu_names
                    .get(name)
                    .and_then(|identity| self.context_menus.get(identity))
            })
    }

    /// Registered chat commands, ordered by primary name.
    pub fn chat_commands(&self) -> Vec<Arc<dyn ChatCommand>> {
        let mut commands: Vec<_> = self.chat.values().cloned().collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    /// Registered slash commands followed by context menus, each ordered by name.
    pub fn application_commands(&self) -> Vec<&RegisteredCommand> {
        let mut slash: Vec<_> = self.slash.values().collect();
        slash.sort_by(|a, b| a.definition.name.cmp(&b.definition.name));
        let mut context_menus: Vec<_> = self.context_menus.values().collect();
        context_menus.sort_by(|a, b| a.definition.name.cmp(&b.definition.name));

        slash.extend(context_menus);
        slash
    }

    /// Dispatch routes for every registered application command.
    pub fn application_routes(&self) -> Vec<InteractionRoute> {
        self.application_commands()
            .into_iter()
            .flat_map(RegisteredCommand::routes)
            .collect()
    }
}

fn forget_names(names: &mut HashMap<String, String>, identity: &str) {
    names.retain(|_, owner| owner != identity);
}

/// Points `name` at `identity`.
///
/// # Returns
/// - `Some(previous)` - Another identity owned the name until now
/// - `None` - The name was free or already owned by `identity`
fn claim_name(names: &mut HashMap<String, String>, name: String, identity: &str) -> Option<String> {
    let previous = names.insert(name.clone(), identity.to_string())?;
    if previous == identity {
        return None;
    }

    warn!(
        "Command name '{}' was claimed by {} and now resolves to {}",
        name, previous, identity
    );
    Some(previous)
}
