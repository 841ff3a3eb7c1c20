//! In-memory stand-ins for the Discord API used by unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use serde_json::{Map, Value};
use serenity::{
    all::{CommandId, GuildId},
    async_trait,
};

use crate::{
    error::{BotError, Result},
    gateway::{request_body, CommandGateway, CommandScope, RemoteCommand, Responder},
    model::{Reply, Source},
};

/// A call made against the fake gateway, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Fetch(CommandScope),
    Upsert(CommandScope, String),
    Delete(CommandScope, CommandId),
}

#[derive(Default)]
struct State {
    commands: BTreeMap<ScopeKey, Vec<RemoteCommand>>,
    calls: Vec<GatewayCall>,
    next_id: u64,
}

/// `CommandScope` ordered for map keys.
type ScopeKey = Option<GuildId>;

#[derive(Default)]
pub struct FakeGateway {
    guilds: HashSet<GuildId>,
    state: Mutex<State>,
    fail_fetch: bool,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guild(mut self, guild_id: GuildId) -> Self {
        self.guilds.insert(guild_id);
        self
    }

    /// Makes every fetch fail like a network error would.
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Seeds a remote command as if it had been registered earlier.
    pub fn with_remote(self, scope: CommandScope, attributes: Value) -> Self {
        if let Value::Object(raw) = attributes {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = CommandId::new(state.next_id);
            let remote = RemoteCommand::from_attributes(id, scope, &raw).unwrap();
            state.commands.entry(scope.guild_id()).or_default().push(remote);
        }
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than fetches.
    pub fn mutations(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, GatewayCall::Fetch(_)))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn commands(&self, scope: CommandScope) -> Vec<RemoteCommand> {
        self.state
            .lock()
            .unwrap()
            .commands
            .get(&scope.guild_id())
            .cloned()
            .unwrap_or_default()
    }

    pub fn command_names(&self, scope: CommandScope) -> Vec<String> {
        self.commands(scope).into_iter().map(|c| c.name).collect()
    }
}

#[async_trait]
impl CommandGateway for FakeGateway {
    async fn known_guilds(&self) -> Vec<GuildId> {
        let mut guilds: Vec<GuildId> = self.guilds.iter().copied().collect();
        guilds.sort();
        guilds
    }

    async fn has_guild(&self, guild_id: GuildId) -> bool {
        self.guilds.contains(&guild_id)
    }

    async fn fetch_commands(&self, scope: CommandScope) -> Result<Vec<RemoteCommand>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Fetch(scope));
        if self.fail_fetch {
            return Err(BotError::handler("connection reset"));
        }
        Ok(state.commands.get(&scope.guild_id()).cloned().unwrap_or_default())
    }

    async fn upsert_command(
        &self,
        scope: CommandScope,
        attributes: &Map<String, Value>,
    ) -> Result<RemoteCommand> {
        let body = request_body(attributes);
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = CommandId::new(state.next_id);
        let remote = RemoteCommand::from_attributes(id, scope, &body)
            .ok_or_else(|| BotError::handler("command without name"))?;

        state
            .calls
            .push(GatewayCall::Upsert(scope, remote.name.clone()));
        let commands = state.commands.entry(scope.guild_id()).or_default();
        commands.retain(|existing| existing.name != remote.name);
        commands.push(remote.clone());

        Ok(remote)
    }

    async fn delete_command(&self, scope: CommandScope, id: CommandId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Delete(scope, id));
        if let Some(commands) = state.commands.get_mut(&scope.guild_id()) {
            commands.retain(|existing| existing.id != id);
        }
        Ok(())
    }
}

/// Responder that records every reply instead of sending it.
#[derive(Default)]
pub struct RecordingResponder {
    replies: Mutex<Vec<(Source, Reply)>>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .map(|(_, reply)| reply.clone())
            .collect()
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn reply(&self, source: &Source, reply: Reply) -> Result<()> {
        self.replies.lock().unwrap().push((source.clone(), reply));
        Ok(())
    }
}
