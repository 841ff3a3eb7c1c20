use std::sync::Arc;

use serde_json::{Map, Value};
use serenity::all::{GuildId, UserId};

use crate::{
    error::Result,
    gateway::Responder,
    model::{Reply, Source},
};

/// Mutable state shared by every middleware and the terminal handler of one dispatch.
#[derive(Clone)]
pub struct DispatchContext {
    pub source: Source,
    /// Resolved command name, `None` for component and modal interactions.
    pub command: Option<String>,
    /// Chat command arguments, or the positional parameters of a dynamic route.
    pub args: Vec<String>,
    /// Context menu target id, or any payload a middleware wants to hand down.
    pub target: Option<Value>,
    pub options: Map<String, Value>,
    responder: Arc<dyn Responder>,
}

impl DispatchContext {
    pub fn new(source: Source, responder: Arc<dyn Responder>) -> Self {
        Self {
            source,
            command: None,
            args: Vec::new(),
            target: None,
            options: Map::new(),
            responder,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Replies to the source of this dispatch.
    pub async fn reply(&self, reply: Reply) -> Result<()> {
        self.responder.reply(&self.source, reply).await
    }

    pub fn user_id(&self) -> UserId {
        self.source.user_id()
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.source.guild_id()
    }

    /// String value of an option by name.
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.options.get(name).and_then(Value::as_str)
    }
}
