use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use serenity::{
    all::{
        CommandId, CreateAutocompleteResponse, CreateInteractionResponse,
        CreateInteractionResponseMessage, CreateMessage, GuildId,
    },
    async_trait,
    http::Http,
    model::application::Command,
};
use tokio::sync::RwLock;

use crate::{
    error::{BotError, Result},
    gateway::{request_body, CommandGateway, CommandScope, RemoteCommand, Responder},
    model::{Reply, Source},
};

/// Guild ids the bot can currently see, fed by `ready`, `guild_create` and
/// `guild_delete`.
pub type GuildSet = Arc<RwLock<HashSet<GuildId>>>;

/// `CommandGateway` over Discord's HTTP API.
pub struct SerenityGateway {
    http: Arc<Http>,
    guilds: GuildSet,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>, guilds: GuildSet) -> Self {
        Self { http, guilds }
    }
}

/// Converts a fetched serenity command into a remote record for `scope`.
pub(crate) fn remote_from_command(
    command: &Command,
    scope: CommandScope,
) -> Result<Option<RemoteCommand>> {
    let raw = match serde_json::to_value(command)? {
        Value::Object(map) => map,
        _ => return Ok(None),
    };

    Ok(RemoteCommand::from_attributes(command.id, scope, &raw))
}

#[async_trait]
impl CommandGateway for SerenityGateway {
    async fn known_guilds(&self) -> Vec<GuildId> {
        let mut guilds: Vec<GuildId> = self.guilds.read().await.iter().copied().collect();
        guilds.sort();
        guilds
    }

    async fn has_guild(&self, guild_id: GuildId) -> bool {
        self.guilds.read().await.contains(&guild_id)
    }

    async fn fetch_commands(&self, scope: CommandScope) -> Result<Vec<RemoteCommand>> {
        let commands = match scope {
            CommandScope::Global => self.http.get_global_commands().await?,
            CommandScope::Guild(guild_id) => self.http.get_guild_commands(guild_id).await?,
        };

        let mut remote = Vec::with_capacity(commands.len());
        for command in &commands {
            if let Some(record) = remote_from_command(command, scope)? {
                remote.push(record);
            }
        }

        Ok(remote)
    }

    async fn upsert_command(
        &self,
        scope: CommandScope,
        attributes: &Map<String, Value>,
    ) -> Result<RemoteCommand> {
        let body = request_body(attributes);
        let command = match scope {
            CommandScope::Global => self.http.create_global_command(&body).await?,
            CommandScope::Guild(guild_id) => {
                self.http.create_guild_command(guild_id, &body).await?
            }
        };

        remote_from_command(&command, scope)?.ok_or_else(|| {
            BotError::handler(format!("Discord returned command {} without a name", command.id))
        })
    }

    async fn delete_command(&self, scope: CommandScope, id: CommandId) -> Result<()> {
        match scope {
            CommandScope::Global => self.http.delete_global_command(id).await?,
            CommandScope::Guild(guild_id) => self.http.delete_guild_command(guild_id, id).await?,
        }

        Ok(())
    }
}

/// `Responder` that answers chat messages with a referenced reply and interactions with
/// an interaction response.
pub struct SerenityResponder {
    http: Arc<Http>,
}

impl SerenityResponder {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Responder for SerenityResponder {
    async fn reply(&self, source: &Source, reply: Reply) -> Result<()> {
        match source {
            Source::Message(message) => {
                let builder = CreateMessage::new()
                    .content(reply.content)
                    .reference_message((message.channel_id, message.id));

                message
                    .channel_id
                    .send_message(self.http.as_ref(), builder)
                    .await?;
            }
            Source::Interaction(event) => {
                let response = if event.is_autocomplete() {
                    let choices = reply.choices.into_iter().fold(
                        CreateAutocompleteResponse::new(),
                        |response, (name, value)| response.add_string_choice(name, value),
                    );
                    CreateInteractionResponse::Autocomplete(choices)
                } else {
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(reply.content)
                            .ephemeral(reply.ephemeral),
                    )
                };

                self.http
                    .create_interaction_response(event.id, &event.token, &response, Vec::new())
                    .await?;
            }
        }

        Ok(())
    }
}
