use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Map;
use serenity::{
    all::{ChannelId, GuildId, InteractionId, MessageId, UserId},
    async_trait,
};

use crate::{
    bot::{Bot, Hook},
    command::{ApplicationCommand, ChatCommand},
    config::Config,
    error::{BotError, Result},
    gateway::fake::{FakeGateway, RecordingResponder},
    middleware::DispatchContext,
    model::{ChatMessage, CommandDefinition, InteractionData, InteractionEvent, Reply},
};

mod boot;

/// Counts `ERROR` events seen by the subscriber it is layered on.
#[derive(Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Routes this thread's events to the counter until the guard is dropped.
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        use tracing_subscriber::layer::SubscriberExt;

        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

const BOT_USER: u64 = 1;
const ADMIN: u64 = 10;
const MEMBER: u64 = 20;

fn guild() -> GuildId {
    GuildId::new(100)
}

/// Command name and positional arguments of every handler invocation.
type Calls = Arc<Mutex<Vec<(Option<String>, Vec<String>)>>>;

fn record(calls: &Calls, ctx: &DispatchContext) {
    calls
        .lock()
        .unwrap()
        .push((ctx.command.clone(), ctx.args.clone()));
}

struct Echo {
    name: &'static str,
    admin_only: bool,
    calls: Calls,
}

#[async_trait]
impl ChatCommand for Echo {
    fn name(&self) -> &str {
        self.name
    }

    fn admin_only(&self) -> bool {
        self.admin_only
    }

    fn identity(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        record(&self.calls, ctx);
        Ok(())
    }
}

struct Ping {
    admin_only: bool,
    fail: bool,
    calls: Calls,
}

#[async_trait]
impl ApplicationCommand for Ping {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::slash("ping", "Check latency")
    }

    fn admin_only(&self) -> bool {
        self.admin_only
    }

    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        record(&self.calls, ctx);
        if self.fail {
            return Err(BotError::handler("ping handler failed"));
        }
        ctx.reply(Reply::new("Pong!")).await
    }

    async fn autocomplete(&self, ctx: &mut DispatchContext) -> Result<()> {
        ctx.reply(Reply::choices([("fast", "fast")])).await
    }
}

fn config() -> Config {
    let mut config = Config::new("token");
    config.admins = vec![UserId::new(ADMIN)];
    config
}

fn echo(bot: &Bot, name: &'static str, admin_only: bool) -> Calls {
    let calls = Calls::default();
    bot.register_chat_command(Arc::new(Echo {
        name,
        admin_only,
        calls: calls.clone(),
    }))
    .unwrap();
    calls
}

fn ping(bot: &Bot, admin_only: bool, fail: bool) -> Calls {
    let calls = Calls::default();
    bot.register_slash_command(Arc::new(Ping {
        admin_only,
        fail,
        calls: calls.clone(),
    }))
    .unwrap();
    calls
}

fn message(author: u64, content: &str) -> ChatMessage {
    ChatMessage {
        id: MessageId::new(500),
        channel_id: ChannelId::new(200),
        guild_id: Some(guild()),
        author_id: UserId::new(author),
        author_is_bot: false,
        content: content.to_string(),
    }
}

fn interaction(user: u64, data: InteractionData) -> InteractionEvent {
    InteractionEvent {
        id: InteractionId::new(700),
        token: "interaction-token".to_string(),
        user_id: UserId::new(user),
        guild_id: Some(guild()),
        channel_id: Some(ChannelId::new(200)),
        data,
    }
}

fn slash(name: &str) -> InteractionData {
    InteractionData::Command {
        name: name.to_string(),
        path: Vec::new(),
        options: Map::new(),
        target_id: None,
    }
}

fn component(custom_id: &str) -> InteractionData {
    InteractionData::Component {
        custom_id: custom_id.to_string(),
        values: Vec::new(),
    }
}

/// Boots `bot` against an empty fake gateway with a recording responder.
async fn boot(bot: &Arc<Bot>) -> Arc<RecordingResponder> {
    boot_with(bot, FakeGateway::new()).await
}

async fn boot_with(bot: &Arc<Bot>, gateway: FakeGateway) -> Arc<RecordingResponder> {
    let responder = Arc::new(RecordingResponder::new());
    bot.set_bot_user(UserId::new(BOT_USER));
    bot.set_responder(responder.clone());
    bot.boot(Arc::new(gateway)).await.unwrap();
    responder
}

/// Records every hook as it fires.
fn record_hooks(bot: &Bot) -> Arc<Mutex<Vec<Hook>>> {
    let fired = Arc::new(Mutex::new(Vec::new()));
    for hook in Hook::ALL {
        let fired = fired.clone();
        bot.on(hook, move |_| {
            let fired = fired.clone();
            async move {
                fired.lock().unwrap().push(hook);
            }
        });
    }
    fired
}
