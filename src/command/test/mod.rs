use std::sync::Arc;

use serenity::async_trait;

use crate::{
    command::{ApplicationCommand, ChatCommand},
    error::Result,
    middleware::DispatchContext,
    model::{CommandDefinition, ContextMenuTarget, OptionSpec},
    router::{handler_fn, InteractionRoute},
};


struct Help;

#[async_trait]
impl ChatCommand for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn aliases(&self) -> Vec<String> {
        vec!["h".to_string(), "commands".to_string()]
    }

    fn interactions(&self) -> Vec<InteractionRoute> {
        vec![InteractionRoute::new(
            "page:{number}",
            handler_fn(|_| async { Ok(()) }),
        )]
    }

    async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
        Ok(())
    }
}

/// Claims the `h` alias that `Help` also declares.
struct History;

#[async_trait]
impl ChatCommand for History {
    fn name(&self) -> &str {
        "history"
    }

    fn aliases(&self) -> Vec<String> {
        vec!["h".to_string()]
    }

    async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
        Ok(())
    }
}

struct Disabled;

#[async_trait]
impl ChatCommand for Disabled {
    fn name(&self) -> &str {
        "maintenance"
    }

    fn enabled(&self) -> bool {
        false
    }

    async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
        Ok(())
    }
}

/// Slash command with a configurable definition.
struct Slash {
    definition: CommandDefinition,
    enabled: bool,
}

impl Slash {
    fn new(definition: CommandDefinition) -> Self {
        Self {
            definition,
            enabled: true,
        }
    }
}

#[async_trait]
impl ApplicationCommand for Slash {
    fn definition(&self) -> CommandDefinition {
        self.definition.clone()
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
        Ok(())
    }
}

/// Context menu used for kind checks.
struct Profile;

#[async_trait]
impl ApplicationCommand for Profile {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::context_menu("Profile", ContextMenuTarget::User)
    }

    async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
        Ok(())
    }
}

fn settings() -> CommandDefinition {
    CommandDefinition::slash("settings", "Bot settings")
        .option(OptionSpec::sub_command("show", "Show settings"))
        .option(
            OptionSpec::group("roles", "Role settings")
                .option(OptionSpec::sub_command("add", "Add a role")),
        )
}

/// Two `stats` slash commands with distinct identities. `zeta` sorts after `alpha` so
/// the later registration is not also the first by identity.
mod zeta {
    use super::*;

    pub struct Stats;

    #[async_trait]
    impl ApplicationCommand for Stats {
        fn definition(&self) -> CommandDefinition {
            CommandDefinition::slash("stats", "First")
        }

        async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
            Ok(())
        }
    }

    /// Chat command named `history`, distinct from the top-level `History`.
    pub struct Archive;

    #[async_trait]
    impl ChatCommand for Archive {
        fn name(&self) -> &str {
            "history"
        }

        fn aliases(&self) -> Vec<String> {
            vec!["log".to_string()]
        }

        async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
            Ok(())
        }
    }
}

mod alpha {
    use super::*;

    pub struct Stats;

    #[async_trait]
    impl ApplicationCommand for Stats {
        fn definition(&self) -> CommandDefinition {
            CommandDefinition::slash("stats", "Second")
        }

        async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
            Ok(())
        }
    }
}
