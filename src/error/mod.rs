//! Error types for the bot framework.
//!
//! `BotError` is the top-level error type. Domain specific failures live in their own
//! enums (`ConfigError`, `DefinitionError`) and convert into `BotError` with `#[from]`.
//! Errors raised inside command, interaction or middleware handlers are converted into log
//! output at the dispatch boundary and never reach the gateway connection.

pub mod config;
pub mod definition;

use serenity::all::GuildId;
use thiserror::Error;

use crate::error::{config::ConfigError, definition::DefinitionError};

/// Top-level framework error type.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration error during startup or environment variable loading.
    ///
    /// Fatal at boot: the binary logs it and exits with a non-zero status.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// A registered value does not satisfy the capability it was registered as.
    ///
    /// Raised at the registration call site and indicates a programming mistake in the
    /// application code, not a runtime condition.
    #[error(transparent)]
    DefinitionErr(#[from] DefinitionError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error raised while booting or stopping services.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// I/O error from command discovery or the HTTP listener.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// JSON (de)serialization error while building or reading command attributes.
    #[error(transparent)]
    JsonErr(#[from] serde_json::Error),

    /// A command was scoped to a guild the bot cannot see.
    ///
    /// Never fatal: registration and unregistration report it as a warning and skip.
    #[error("Guild {0} was not found in the live guild cache")]
    GuildNotFound(GuildId),

    /// Failure raised by an application-provided handler.
    #[error("{0}")]
    Handler(String),

    /// The boot sequence failed after the gateway connected.
    #[error("Boot aborted: {0}")]
    BootAborted(String),

    /// `Bot::run` was called while a previous call still owns the control channel.
    #[error("The bot is already running")]
    AlreadyRunning,

    /// The gateway task panicked or was cancelled.
    #[error(transparent)]
    TaskErr(#[from] tokio::task::JoinError),
}

/// Manual conversion from serenity::Error to BotError.
///
/// Boxes the error to reduce the size of the BotError enum.
impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        BotError::DiscordErr(Box::new(err))
    }
}

impl BotError {
    /// Creates a handler error from any displayable message.
    ///
    /// # Arguments
    /// - `message` - Description of what went wrong inside the handler
    ///
    /// # Returns
    /// - `BotError::Handler` wrapping the message
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

pub type Result<T, E = BotError> = std::result::Result<T, E>;
