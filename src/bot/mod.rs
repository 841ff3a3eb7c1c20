//! The bot: configuration, registries and lifecycle state behind one shared value.
//!
//! A `Bot` is built once, populated through its registration methods and then shared as
//! `Arc<Bot>` with the gateway event handler, services, hooks and listeners. Registries
//! sit behind `std::sync::RwLock`s that are never held across an `.await`.

pub mod dispatch;
pub mod event;
pub mod handler;
pub mod hook;
pub mod lifecycle;

#[cfg(test)]
mod test;

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serenity::all::{GuildId, UserId};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    auth::{AdminGate, UserStore},
    command::{
        ApplicationCommand, CatalogItem, ChatCommand, CommandCatalog, CommandRegistry,
        RegisteredCommand,
    },
    config::Config,
    error::{definition::DefinitionError, Result},
    gateway::Responder,
    http::HttpServer,
    middleware::{Middleware, MiddlewareFactory, MiddlewareSpec, Pipeline},
    model::CommandKind,
    router::{InteractionRoute, InteractionRouter},
    service::{Service, ServiceRunner},
};

pub use dispatch::DispatchOutcome;
pub use event::{EventKind, EventListener, GatewayEvent};
pub use hook::{Hook, HookRegistry};

/// Requests handled by the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Control {
    Shutdown,
    Restart,
    Abort(String),
}

/// Cloneable handle used to stop or restart a running bot from anywhere.
#[derive(Clone)]
pub struct BotHandle {
    control: mpsc::UnboundedSender<Control>,
}

impl BotHandle {
    pub fn shutdown(&self) {
        self.send(Control::Shutdown);
    }

    /// Stops everything and boots again on a fresh gateway connection.
    pub fn restart(&self) {
        self.send(Control::Restart);
    }

    pub(crate) fn abort(&self, reason: impl Into<String>) {
        self.send(Control::Abort(reason.into()));
    }

    fn send(&self, control: Control) {
        if self.control.send(control).is_err() {
            debug!("Bot is not running, control request dropped");
        }
    }
}

#[derive(Default)]
struct Flags {
    booted: AtomicBool,
    commands_registered: AtomicBool,
    routes_wired: AtomicBool,
    events_registered: AtomicBool,
    interactions_registered: AtomicBool,
    restarting: AtomicBool,
}

pub struct Bot {
    config: Config,
    registry: RwLock<CommandRegistry>,
    router: RwLock<InteractionRouter>,
    pipeline: RwLock<Pipeline>,
    gate: AdminGate,
    hooks: HookRegistry,
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
    services: Mutex<Vec<Arc<dyn Service>>>,
    runner: tokio::sync::Mutex<ServiceRunner>,
    http_router: RwLock<Option<axum::Router>>,
    http_server: tokio::sync::Mutex<Option<HttpServer>>,
    guild_prefixes: RwLock<HashMap<GuildId, String>>,
    bot_user: RwLock<Option<UserId>>,
    responder: RwLock<Option<Arc<dyn Responder>>>,
    flags: Flags,
    control: mpsc::UnboundedSender<Control>,
    control_rx: Mutex<Option<mpsc::UnboundedReceiver<Control>>>,
}

impl Bot {
    pub fn new(config: Config) -> Self {
        let pipeline = Pipeline::new(MiddlewareFactory::with_builtins(config.rate_limit));
        let gate = AdminGate::new(config.admins.clone());
        let (control, control_rx) = mpsc::unbounded_channel();

        Self {
            config,
            registry: RwLock::new(CommandRegistry::new()),
            router: RwLock::new(InteractionRouter::new()),
            pipeline: RwLock::new(pipeline),
            gate,
            hooks: HookRegistry::new(),
            listeners: RwLock::new(Vec::new()),
            services: Mutex::new(Vec::new()),
            runner: tokio::sync::Mutex::new(ServiceRunner::new()),
            http_router: RwLock::new(None),
            http_server: tokio::sync::Mutex::new(None),
            guild_prefixes: RwLock::new(HashMap::new()),
            bot_user: RwLock::new(None),
            responder: RwLock::new(None),
            flags: Flags::default(),
            control,
            control_rx: Mutex::new(Some(control_rx)),
        }
    }

    /// Consults `users` for the admin flag when no static admins are configured.
    pub fn with_user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.gate = AdminGate::new(self.config.admins.clone()).with_user_store(users);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read access to the command registry, e.g. for help output.
    pub fn registry(&self) -> RwLockReadGuard<'_, CommandRegistry> {
        read(&self.registry)
    }

    pub fn handle(&self) -> BotHandle {
        BotHandle {
            control: self.control.clone(),
        }
    }

    pub fn is_booted(&self) -> bool {
        self.flags.booted.load(Ordering::SeqCst)
    }

    pub fn bot_user(&self) -> Option<UserId> {
        *read(&self.bot_user)
    }

    /// Registers a chat command and the interaction routes it owns.
    ///
    /// # Returns
    /// - `Ok(())` - Registered, or skipped because the command is disabled
    /// - `Err(BotError::DefinitionErr)` - Invalid name, route or route middleware
    pub fn register_chat_command(&self, command: Arc<dyn ChatCommand>) -> Result<()> {
        let routes = write(&self.registry).register_chat(command)?;
        for route in routes {
            self.add_route(route)?;
        }
        Ok(())
    }

    /// Registers a slash command. Its routes are wired during boot, or immediately when
    /// registered after boot. Remote registration happens on the next boot.
    pub fn register_slash_command(&self, command: Arc<dyn ApplicationCommand>) -> Result<()> {
        self.validate_middleware(&command.middleware())?;
        write(&self.registry).register_slash(command.clone())?;
        self.wire_late_registration(command)
    }

    pub fn register_context_menu(&self, command: Arc<dyn ApplicationCommand>) -> Result<()> {
        self.validate_middleware(&command.middleware())?;
        write(&self.registry).register_context_menu(command.clone())?;
        self.wire_late_registration(command)
    }

    /// Registers every command of `kind` discovered under `directory`.
    ///
    /// # Arguments
    /// - `catalog` - Constructors for the identifiers the directory may contain
    /// - `kind` - Capability discovered values must have
    /// - `directory` - Root of the commands tree, a missing directory discovers nothing
    /// - `pattern` - Namespace pattern with at most one `*`
    ///
    /// # Returns
    /// - `Ok(Vec<String>)` - Identifiers of the registered commands
    /// - `Err(BotError)` - The directory could not be read or a command is invalid
    pub fn discover_commands(
        &self,
        catalog: &CommandCatalog,
        kind: CommandKind,
        directory: &Path,
        pattern: &str,
    ) -> Result<Vec<String>> {
        let discovered = catalog.discover(kind, directory, pattern)?;
        let mut identifiers = Vec::with_capacity(discovered.len());

        for (id, item) in discovered {
            match item {
                CatalogItem::Chat(command) => self.register_chat_command(command)?,
                CatalogItem::Application(command) => match kind {
                    CommandKind::ContextMenu => self.register_context_menu(command)?,
                    _ => self.register_slash_command(command)?,
                },
            }
            identifiers.push(id);
        }

        info!("Discovered {} {:?} command(s)", identifiers.len(), kind);

        Ok(identifiers)
    }

    /// Adds a component or modal route.
    ///
    /// # Returns
    /// - `Ok(())` - Route stored, replacing any route with the same key
    /// - `Err(BotError::DefinitionErr)` - Malformed key or unresolvable middleware
    pub fn add_route(&self, route: InteractionRoute) -> Result<()> {
        self.validate_middleware(&route.middleware)?;
        write(&self.router).add(route)?;
        Ok(())
    }

    /// Appends middleware to the global chain that wraps every dispatch.
    pub fn use_middleware(&self, spec: impl Into<MiddlewareSpec>) -> Result<()> {
        write(&self.pipeline).add_global(spec.into())?;
        Ok(())
    }

    /// Makes a middleware constructor available by name to string specifications.
    pub fn register_middleware<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&[String]) -> std::result::Result<Arc<dyn Middleware>, String>
            + Send
            + Sync
            + 'static,
    {
        write(&self.pipeline)
            .factory_mut()
            .register(name, constructor);
    }

    pub fn on<F, Fut>(&self, hook: Hook, callback: F)
    where
        F: Fn(Arc<Bot>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.on(hook, callback);
    }

    /// # Returns
    /// - `Err(DefinitionError::InvalidDefinition)` - The listener subscribes to nothing
    pub fn add_event_listener(&self, listener: Arc<dyn EventListener>) -> Result<()> {
        if listener.events().is_empty() {
            return Err(DefinitionError::invalid_definition(
                listener.name(),
                "event listener subscribes to no events",
            )
            .into());
        }

        write(&self.listeners).push(listener);
        Ok(())
    }

    /// Adds a periodic service, started at boot.
    ///
    /// # Returns
    /// - `Err(DefinitionError::InvalidDefinition)` - The interval is zero
    pub fn add_service(&self, service: Arc<dyn Service>) -> Result<()> {
        if service.interval().is_zero() {
            return Err(DefinitionError::invalid_definition(
                service.name(),
                "service interval must be greater than zero",
            )
            .into());
        }

        lock(&self.services).push(service);
        Ok(())
    }

    /// Routes served when an HTTP address is configured.
    pub fn serve_http(&self, router: axum::Router) {
        *write(&self.http_router) = Some(router);
    }

    /// Prefix matched by the `@guild` prefix sentinel for messages from `guild_id`.
    pub fn set_guild_prefix(&self, guild_id: GuildId, prefix: impl Into<String>) {
        write(&self.guild_prefixes).insert(guild_id, prefix.into());
    }

    pub(crate) fn guild_prefix(&self, guild_id: GuildId) -> Option<String> {
        read(&self.guild_prefixes).get(&guild_id).cloned()
    }

    pub(crate) fn set_bot_user(&self, user_id: UserId) {
        *write(&self.bot_user) = Some(user_id);
    }

    pub(crate) fn set_responder(&self, responder: Arc<dyn Responder>) {
        *write(&self.responder) = Some(responder);
    }

    pub(crate) fn responder(&self) -> Option<Arc<dyn Responder>> {
        read(&self.responder).clone()
    }

    pub(crate) fn pipeline(&self) -> Pipeline {
        read(&self.pipeline).clone()
    }

    pub(crate) fn gate(&self) -> &AdminGate {
        &self.gate
    }

    pub(crate) fn listeners(&self) -> Vec<Arc<dyn EventListener>> {
        read(&self.listeners).clone()
    }

    pub(crate) fn events_registered(&self) -> bool {
        self.flags.events_registered.load(Ordering::SeqCst)
    }

    fn validate_middleware(&self, specs: &[MiddlewareSpec]) -> Result<()> {
        read(&self.pipeline).validate(specs)?;
        Ok(())
    }

    /// Wires routes for an application command registered after boot.
    fn wire_late_registration(&self, command: Arc<dyn ApplicationCommand>) -> Result<()> {
        if !self.flags.routes_wired.load(Ordering::SeqCst) || !command.enabled() {
            return Ok(());
        }

        let registered = RegisteredCommand {
            definition: command.definition(),
            command,
        };
        let mut router = write(&self.router);
        for route in registered.routes() {
            router.add(route)?;
        }
        Ok(())
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
