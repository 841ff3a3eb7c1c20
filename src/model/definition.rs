//! Application command definitions.
//!
//! A `CommandDefinition` describes a slash command or context menu as it is declared
//! locally. It materializes into the JSON attribute set that is both sent to Discord and
//! compared against the remote registry during reconciliation.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use serenity::all::GuildId;

use crate::{
    error::definition::DefinitionError,
    model::source::PATH_SEPARATOR,
    router::RouteHandler,
};

const MAX_NAME_LENGTH: usize = 32;
const MAX_DESCRIPTION_LENGTH: usize = 100;
const MAX_OPTIONS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    ChatCommand,
    SlashCommand,
    ContextMenu,
}

/// What a context menu is attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContextMenuTarget {
    #[default]
    User,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    SubCommand,
    SubCommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl OptionKind {
    /// Discord's numeric option type.
    pub const fn code(self) -> u8 {
        match self {
            Self::SubCommand => 1,
            Self::SubCommandGroup => 2,
            Self::String => 3,
            Self::Integer => 4,
            Self::Boolean => 5,
            Self::User => 6,
            Self::Channel => 7,
            Self::Role => 8,
            Self::Mentionable => 9,
            Self::Number => 10,
            Self::Attachment => 11,
        }
    }

    pub const fn is_sub_command(self) -> bool {
        matches!(self, Self::SubCommand | Self::SubCommandGroup)
    }
}

impl Serialize for OptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: Value,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A command option. Sub-command and sub-command-group options nest further options.
#[derive(Clone, Serialize)]
pub struct OptionSpec {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    #[serde(skip_serializing_if = "is_false")]
    pub autocomplete: bool,
    /// Dedicated handler for a sub-command leaf. Falls back to the command's handler.
    #[serde(skip)]
    pub handler: Option<Arc<dyn RouteHandler>>,
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("required", &self.required)
            .field("choices", &self.choices)
            .field("options", &self.options)
            .field("autocomplete", &self.autocomplete)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl OptionSpec {
    pub fn new(kind: OptionKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            options: Vec::new(),
            autocomplete: false,
            handler: None,
        }
    }

    pub fn sub_command(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(OptionKind::SubCommand, name, description)
    }

    pub fn group(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(OptionKind::SubCommandGroup, name, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choice(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    pub fn handler(mut self, handler: Arc<dyn RouteHandler>) -> Self {
        self.handler = Some(handler);
        self
    }
}

/// Locally declared slash command or context menu.
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub kind: CommandKind,
    pub target: ContextMenuTarget,
    /// `None` registers the command globally.
    pub guild_id: Option<GuildId>,
    pub options: Vec<OptionSpec>,
    pub permissions: Option<u64>,
    pub nsfw: bool,
    pub dm_permission: Option<bool>,
}

impl CommandDefinition {
    pub fn slash(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: CommandKind::SlashCommand,
            target: ContextMenuTarget::default(),
            guild_id: None,
            options: Vec::new(),
            permissions: None,
            nsfw: false,
            dm_permission: None,
        }
    }

    pub fn context_menu(name: impl Into<String>, target: ContextMenuTarget) -> Self {
        Self {
            kind: CommandKind::ContextMenu,
            target,
            ..Self::slash(name, "")
        }
    }

    pub fn guild(mut self, guild_id: GuildId) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn permissions(mut self, bits: u64) -> Self {
        self.permissions = Some(bits);
        self
    }

    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    pub fn dm_permission(mut self, allowed: bool) -> Self {
        self.dm_permission = Some(allowed);
        self
    }

    /// Discord's numeric application command type.
    pub const fn discord_type(&self) -> u8 {
        match (self.kind, self.target) {
            (CommandKind::ContextMenu, ContextMenuTarget::User) => 2,
            (CommandKind::ContextMenu, ContextMenuTarget::Message) => 3,
            _ => 1,
        }
    }

    /// Materializes the creatable attribute set, sorted by key.
    ///
    /// `dm_permission` only applies to global commands and defaults to `true`, matching
    /// what Discord reports back for commands created without it.
    ///
    /// # Returns
    /// - `Ok(Map)` - Attributes keyed by Discord field name
    /// - `Err(serde_json::Error)` - Option serialization failed
    pub fn creatable_attributes(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut attributes = Map::new();

        attributes.insert("type".to_string(), Value::from(self.discord_type()));
        attributes.insert("name".to_string(), Value::String(self.name.clone()));
        attributes.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        attributes.insert("options".to_string(), serde_json::to_value(&self.options)?);
        attributes.insert("nsfw".to_string(), Value::Bool(self.nsfw));
        attributes.insert(
            "default_member_permissions".to_string(),
            self.permissions
                .map(|bits| Value::String(bits.to_string()))
                .unwrap_or(Value::Null),
        );

        match self.guild_id {
            Some(guild_id) => {
                attributes.insert("guild_id".to_string(), Value::String(guild_id.to_string()));
            }
            None => {
                attributes.insert("guild_id".to_string(), Value::Null);
                attributes.insert(
                    "dm_permission".to_string(),
                    Value::Bool(self.dm_permission.unwrap_or(true)),
                );
            }
        }

        Ok(attributes)
    }

    /// Checks the definition against Discord's command constraints.
    ///
    /// # Returns
    /// - `Ok(())` - Definition is valid
    /// - `Err(DefinitionError::InvalidDefinition)` - Name, description or options violate
    ///   the constraints for this command kind
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let invalid = |reason: &str| DefinitionError::invalid_definition(&self.name, reason);

        match self.kind {
            CommandKind::ChatCommand => {
                return Err(invalid("chat commands are not application commands"));
            }
            CommandKind::SlashCommand => {
                validate_slash_name(&self.name).map_err(|reason| invalid(&reason))?;
                validate_description(&self.description).map_err(|reason| invalid(&reason))?;
                validate_options(&self.options).map_err(|reason| invalid(&reason))?;
            }
            CommandKind::ContextMenu => {
                let length = self.name.chars().count();
                if length == 0 || length > MAX_NAME_LENGTH {
                    return Err(invalid("name must be between 1 and 32 characters"));
                }
                if !self.description.is_empty() {
                    return Err(invalid("context menus cannot have a description"));
                }
                if !self.options.is_empty() {
                    return Err(invalid("context menus cannot have options"));
                }
            }
        }

        Ok(())
    }

    /// Route keys for every leaf sub-command, with the leaf's dedicated handler if any.
    ///
    /// Returns `name@sub` for sub-commands and `name@group@sub` for sub-commands inside a
    /// group. Commands without sub-commands have no leaf paths.
    pub fn leaf_paths(&self) -> Vec<(String, Option<Arc<dyn RouteHandler>>)> {
        let mut paths = Vec::new();
        collect_leaf_paths(&self.name, &self.options, &mut paths);
        paths
    }
}

fn collect_leaf_paths(
    prefix: &str,
    options: &[OptionSpec],
    paths: &mut Vec<(String, Option<Arc<dyn RouteHandler>>)>,
) {
    for option in options {
        let key = format!("{prefix}{PATH_SEPARATOR}{}", option.name);
        match option.kind {
            OptionKind::SubCommand => paths.push((key, option.handler.clone())),
            OptionKind::SubCommandGroup => collect_leaf_paths(&key, &option.options, paths),
            _ => {}
        }
    }
}

fn validate_slash_name(name: &str) -> Result<(), String> {
    let length = name.chars().count();
    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(format!("name '{name}' must be between 1 and 32 characters"));
    }
    if name
        .chars()
        .any(|c| c.is_uppercase() || !(c.is_alphanumeric() || c == '-' || c == '_'))
    {
        return Err(format!(
            "name '{name}' may only contain lowercase letters, digits, '-' and '_'"
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), String> {
    let length = description.chars().count();
    if length == 0 || length > MAX_DESCRIPTION_LENGTH {
        return Err("description must be between 1 and 100 characters".to_string());
    }
    Ok(())
}

fn validate_options(options: &[OptionSpec]) -> Result<(), String> {
    if options.len() > MAX_OPTIONS {
        return Err("at most 25 options are allowed".to_string());
    }

    let sub_commands = options.iter().filter(|o| o.kind.is_sub_command()).count();
    if sub_commands > 0 && sub_commands != options.len() {
        return Err("sub-commands cannot be mixed with regular options".to_string());
    }

    let mut seen_optional = false;
    for option in options {
        validate_slash_name(&option.name)?;
        validate_description(&option.description)?;

        if option.kind.is_sub_command() {
            if option.required {
                return Err(format!("sub-command '{}' cannot be required", option.name));
            }
            validate_options(&option.options)?;
            continue;
        }

        if !option.options.is_empty() {
            return Err(format!("option '{}' cannot nest options", option.name));
        }
        if option.required && seen_optional {
            return Err(format!(
                "required option '{}' must come before optional options",
                option.name
            ));
        }
        seen_optional |= !option.required;
    }

    Ok(())
}
