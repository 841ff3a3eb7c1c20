//! Inbound trigger sources.
//!
//! Every dispatch starts from a `Source`: either a chat message parsed for a prefix
//! command or an interaction (application command, autocomplete, component, modal).

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use serenity::all::{
    ActionRowComponent, ChannelId, CommandDataOption, CommandDataOptionValue,
    ComponentInteractionDataKind, GuildId, Interaction, InteractionId, Message, MessageId, UserId,
};

/// Separator between a command name and its sub-command path in route keys.
pub const PATH_SEPARATOR: char = '@';

/// A chat message as seen by the chat command dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author_id: UserId,
    pub author_is_bot: bool,
    pub content: String,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            guild_id: message.guild_id,
            author_id: message.author.id,
            author_is_bot: message.author.bot,
            content: message.content.clone(),
        }
    }
}

/// The option currently being typed during an autocomplete interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedOption {
    pub name: String,
    pub value: String,
}

/// Payload of an interaction, reduced to what routing and handlers need.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionData {
    /// Slash command or context menu invocation.
    Command {
        name: String,
        /// Sub-command group and sub-command names, outermost first.
        path: Vec<String>,
        /// Leaf option values keyed by option name.
        options: Map<String, Value>,
        /// Target user or message id for context menus.
        target_id: Option<u64>,
    },
    Autocomplete {
        name: String,
        path: Vec<String>,
        options: Map<String, Value>,
        focused: Option<FocusedOption>,
    },
    /// Button or select menu callback.
    Component { custom_id: String, values: Vec<String> },
    /// Modal submission. Fields are keyed by input custom id.
    Modal {
        custom_id: String,
        fields: BTreeMap<String, String>,
    },
}

/// An interaction as seen by the interaction router.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEvent {
    pub id: InteractionId,
    pub token: String,
    pub user_id: UserId,
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub data: InteractionData,
}

impl InteractionEvent {
    /// Converts a serenity interaction.
    ///
    /// # Returns
    /// - `Some(InteractionEvent)` - For command, autocomplete, component and modal interactions
    /// - `None` - For pings and interaction types the router does not handle
    pub fn from_interaction(interaction: &Interaction) -> Option<Self> {
        match interaction {
            Interaction::Command(command) => {
                let (path, options, _) = flatten_options(&command.data.options);
                Some(Self {
                    id: command.id,
                    token: command.token.clone(),
                    user_id: command.user.id,
                    guild_id: command.guild_id,
                    channel_id: Some(command.channel_id),
                    data: InteractionData::Command {
                        name: command.data.name.clone(),
                        path,
                        options,
                        target_id: command.data.target_id.map(|id| id.get()),
                    },
                })
            }
            Interaction::Autocomplete(command) => {
                let (path, options, focused) = flatten_options(&command.data.options);
                Some(Self {
                    id: command.id,
                    token: command.token.clone(),
                    user_id: command.user.id,
                    guild_id: command.guild_id,
                    channel_id: Some(command.channel_id),
                    data: InteractionData::Autocomplete {
                        name: command.data.name.clone(),
                        path,
                        options,
                        focused,
                    },
                })
            }
            Interaction::Component(component) => {
                let values = match &component.data.kind {
                    ComponentInteractionDataKind::StringSelect { values } => values.clone(),
                    ComponentInteractionDataKind::UserSelect { values } => {
                        values.iter().map(ToString::to_string).collect()
                    }
                    ComponentInteractionDataKind::RoleSelect { values } => {
                        values.iter().map(ToString::to_string).collect()
                    }
                    ComponentInteractionDataKind::MentionableSelect { values } => {
                        values.iter().map(ToString::to_string).collect()
                    }
                    ComponentInteractionDataKind::ChannelSelect { values } => {
                        values.iter().map(ToString::to_string).collect()
                    }
                    _ => Vec::new(),
                };
                Some(Self {
                    id: component.id,
                    token: component.token.clone(),
                    user_id: component.user.id,
                    guild_id: component.guild_id,
                    channel_id: Some(component.channel_id),
                    data: InteractionData::Component {
                        custom_id: component.data.custom_id.clone(),
                        values,
                    },
                })
            }
            Interaction::Modal(modal) => {
                let fields = modal
                    .data
                    .components
                    .iter()
                    .flat_map(|row| row.components.iter())
                    .filter_map(|component| match component {
                        ActionRowComponent::InputText(input) => Some((
                            input.custom_id.clone(),
                            input.value.clone().unwrap_or_default(),
                        )),
                        _ => None,
                    })
                    .collect();
                Some(Self {
                    id: modal.id,
                    token: modal.token.clone(),
                    user_id: modal.user.id,
                    guild_id: modal.guild_id,
                    channel_id: Some(modal.channel_id),
                    data: InteractionData::Modal {
                        custom_id: modal.data.custom_id.clone(),
                        fields,
                    },
                })
            }
            _ => None,
        }
    }

    /// Route key used to look up the handler.
    ///
    /// Commands and autocomplete resolve to `name`, `name@sub` or `name@group@sub`;
    /// components and modals resolve to their custom id.
    pub fn route_key(&self) -> String {
        match &self.data {
            InteractionData::Command { name, path, .. }
            | InteractionData::Autocomplete { name, path, .. } => command_route_key(name, path),
            InteractionData::Component { custom_id, .. }
            | InteractionData::Modal { custom_id, .. } => custom_id.clone(),
        }
    }

    pub fn is_autocomplete(&self) -> bool {
        matches!(self.data, InteractionData::Autocomplete { .. })
    }

    /// Whether this interaction invokes an application command.
    pub fn is_command(&self) -> bool {
        matches!(self.data, InteractionData::Command { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self.data {
            InteractionData::Command { .. } => "command",
            InteractionData::Autocomplete { .. } => "autocomplete",
            InteractionData::Component { .. } => "component",
            InteractionData::Modal { .. } => "modal",
        }
    }
}

/// Joins a command name and its sub-command path into a route key.
pub fn command_route_key(name: &str, path: &[String]) -> String {
    std::iter::once(name)
        .chain(path.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string())
}

/// Walks nested sub-command options, returning the sub-command path, the leaf option
/// values and the focused autocomplete option if any.
fn flatten_options(
    options: &[CommandDataOption],
) -> (Vec<String>, Map<String, Value>, Option<FocusedOption>) {
    let mut path = Vec::new();
    let mut values = Map::new();
    let mut focused = None;
    let mut current = options;

    loop {
        match current.first().map(|option| (&option.name, &option.value)) {
            Some((name, CommandDataOptionValue::SubCommand(nested)))
            | Some((name, CommandDataOptionValue::SubCommandGroup(nested))) => {
                path.push(name.clone());
                current = nested;
            }
            _ => break,
        }
    }

    for option in current {
        let value = match &option.value {
            CommandDataOptionValue::String(s) => Value::String(s.clone()),
            CommandDataOptionValue::Integer(i) => Value::from(*i),
            CommandDataOptionValue::Number(n) => Value::from(*n),
            CommandDataOptionValue::Boolean(b) => Value::Bool(*b),
            CommandDataOptionValue::User(id) => Value::String(id.to_string()),
            CommandDataOptionValue::Channel(id) => Value::String(id.to_string()),
            CommandDataOptionValue::Role(id) => Value::String(id.to_string()),
            CommandDataOptionValue::Mentionable(id) => Value::String(id.to_string()),
            CommandDataOptionValue::Attachment(id) => Value::String(id.to_string()),
            CommandDataOptionValue::Autocomplete { value, .. } => {
                focused = Some(FocusedOption {
                    name: option.name.clone(),
                    value: value.clone(),
                });
                Value::String(value.clone())
            }
            _ => continue,
        };
        values.insert(option.name.clone(), value);
    }

    (path, values, focused)
}

/// Originating trigger of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Message(ChatMessage),
    Interaction(InteractionEvent),
}

impl Source {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Message(message) => message.author_id,
            Self::Interaction(event) => event.user_id,
        }
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        match self {
            Self::Message(message) => message.guild_id,
            Self::Interaction(event) => event.guild_id,
        }
    }

    /// Short name of the source type, used in log fields and rate limit signatures.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Interaction(event) => event.kind_name(),
        }
    }

    pub fn as_interaction(&self) -> Option<&InteractionEvent> {
        match self {
            Self::Interaction(event) => Some(event),
            Self::Message(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&ChatMessage> {
        match self {
            Self::Message(message) => Some(message),
            Self::Interaction(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(data: InteractionData) -> InteractionEvent {
        InteractionEvent {
            id: InteractionId::new(1),
            token: "token".to_string(),
            user_id: UserId::new(2),
            guild_id: Some(GuildId::new(3)),
            channel_id: None,
            data,
        }
    }

    #[test]
    fn top_level_command_routes_by_name() {
        let event = event(InteractionData::Command {
            name: "ping".to_string(),
            path: Vec::new(),
            options: Map::new(),
            target_id: None,
        });

        assert_eq!(event.route_key(), "ping");
        assert!(event.is_command());
    }

    #[test]
    fn grouped_command_routes_by_path() {
        let event = event(InteractionData::Autocomplete {
            name: "settings".to_string(),
            path: vec!["roles".to_string(), "add".to_string()],
            options: Map::new(),
            focused: None,
        });

        assert_eq!(event.route_key(), "settings@roles@add");
        assert!(event.is_autocomplete());
    }

    #[test]
    fn component_routes_by_custom_id() {
        let event = event(InteractionData::Component {
            custom_id: "vote:42:yes".to_string(),
            values: Vec::new(),
        });

        assert_eq!(event.route_key(), "vote:42:yes");
        assert_eq!(Source::Interaction(event).kind_name(), "component");
    }
}
