//! Command registration, interaction routing and middleware dispatch for Discord bots
//! built on serenity.
//!
//! A [`Bot`] collects chat commands, slash commands, context menus, interaction routes,
//! middleware, event listeners and services. When the gateway connection is ready it
//! reconciles the declared application commands with Discord's registry and starts
//! dispatching messages and interactions through the middleware pipeline.

pub mod auth;
pub mod bot;
pub mod command;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod model;
pub mod reconcile;
pub mod router;
pub mod service;

pub use bot::{Bot, BotHandle, DispatchOutcome, EventKind, EventListener, GatewayEvent, Hook};
pub use command::{ApplicationCommand, ChatCommand, CommandCatalog};
pub use config::Config;
pub use error::{BotError, Result};
pub use middleware::{DispatchContext, Middleware, MiddlewareSpec, Next};
pub use model::{CommandDefinition, OptionKind, OptionSpec, Reply};
pub use router::{handler_fn, InteractionRoute};
pub use service::Service;
