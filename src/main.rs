use std::sync::{Arc, Weak};

use axum::{routing::get, Router};
use serenity::async_trait;
use switchboard::{
    logger, ApplicationCommand, Bot, BotError, ChatCommand, CommandDefinition, Config,
    DispatchContext, Hook, Reply, Result,
};
use tracing::{error, info};

struct Ping;

#[async_trait]
impl ChatCommand for Ping {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Check that the bot is alive"
    }

    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        ctx.reply(Reply::new("Pong!")).await
    }
}

struct SlashPing;

#[async_trait]
impl ApplicationCommand for SlashPing {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::slash("ping", "Check that the bot is alive")
    }

    fn middleware(&self) -> Vec<switchboard::MiddlewareSpec> {
        vec!["throttle:5,1".into()]
    }

    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        ctx.reply(Reply::new("Pong!").ephemeral()).await
    }
}

/// Lists registered commands.
struct Help {
    bot: Weak<Bot>,
}

#[async_trait]
impl ChatCommand for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn aliases(&self) -> Vec<String> {
        vec!["commands".to_string()]
    }

    fn description(&self) -> &str {
        "List available commands"
    }

    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        let Some(bot) = self.bot.upgrade() else {
            return Ok(());
        };

        let text = {
            let registry = bot.registry();
            let mut lines: Vec<String> = registry
                .chat_commands()
                .iter()
                .map(|command| {
                    let usage = command.usage().map(|u| format!(" {u}")).unwrap_or_default();
                    format!("`{}{}` {}", command.name(), usage, command.description())
                })
                .collect();
            lines.extend(
                registry
                    .application_commands()
                    .iter()
                    .map(|registered| format!("`/{}`", registered.definition.name)),
            );
            lines.join("\n")
        };

        ctx.reply(Reply::new(text)).await
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), BotError> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            logger::init("info");
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    logger::init(&config.log_level);

    let bot = Arc::new(Bot::new(config));

    bot.use_middleware("logging")?;
    bot.use_middleware("throttle")?;
    bot.register_chat_command(Arc::new(Ping))?;
    bot.register_chat_command(Arc::new(Help {
        bot: Arc::downgrade(&bot),
    }))?;
    bot.register_slash_command(Arc::new(SlashPing))?;
    bot.serve_http(Router::new().route("/health", get(|| async { "ok" })));

    bot.on(Hook::AfterBoot, |bot| async move {
        let commands = bot.registry().chat_commands().len();
        info!("Ready with {} chat command(s)", commands);
    });

    bot.run().await
}
