use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use serenity::all::{CommandId, GuildId};

use crate::{
    gateway::{
        fake::{FakeGateway, GatewayCall},
        CommandScope,
    },
    model::{CommandDefinition, OptionKind, OptionSpec},
    reconcile::{plan, LocalCommand, Reconciler},
};

mod apply;
mod diff;

fn g1() -> GuildId {
    GuildId::new(100)
}

fn local(definitions: Vec<CommandDefinition>) -> BTreeMap<String, LocalCommand> {
    definitions
        .into_iter()
        .map(|definition| {
            let command = LocalCommand {
                name: definition.name.clone(),
                guild_id: definition.guild_id,
                attributes: definition.creatable_attributes().unwrap(),
            };
            (command.name.clone(), command)
        })
        .collect()
}

fn ping() -> CommandDefinition {
    CommandDefinition::slash("ping", "Check latency")
}

fn ban() -> CommandDefinition {
    CommandDefinition::slash("ban", "Ban a member")
        .guild(g1())
        .option(OptionSpec::new(OptionKind::User, "member", "Member to ban").required())
        .permissions(4)
}
