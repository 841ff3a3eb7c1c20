use std::sync::{Arc, Mutex};

use serenity::{
    all::{ChannelId, GuildId, MessageId, UserId},
    async_trait,
};

use crate::{
    config::RateLimitConfig,
    error::Result,
    gateway::fake::RecordingResponder,
    middleware::{DispatchContext, Middleware, MiddlewareFactory, Next, Pipeline},
    model::{ChatMessage, Source},
};


type Trace = Arc<Mutex<Vec<String>>>;

/// Records its label before and after the rest of the chain.
struct Recorder {
    label: &'static str,
    trace: Trace,
}

#[async_trait]
impl Middleware for Recorder {
    async fn handle(&self, ctx: &mut DispatchContext, next: Next<'_>) -> Result<()> {
        self.trace.lock().unwrap().push(format!("{}:before", self.label));
        let result = next.run(ctx).await;
        self.trace.lock().unwrap().push(format!("{}:after", self.label));
        result
    }
}

/// Never calls `next`.
struct Halt;

#[async_trait]
impl Middleware for Halt {
    async fn handle(&self, _ctx: &mut DispatchContext, _next: Next<'_>) -> Result<()> {
        Ok(())
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(MiddlewareFactory::with_builtins(RateLimitConfig::default()))
}

fn message(user: u64) -> Source {
    Source::Message(ChatMessage {
        id: MessageId::new(1),
        channel_id: ChannelId::new(2),
        guild_id: Some(GuildId::new(3)),
        author_id: UserId::new(user),
        author_is_bot: false,
        content: "!ping".to_string(),
    })
}

fn context(responder: &Arc<RecordingResponder>, user: u64) -> DispatchContext {
    DispatchContext::new(message(user), responder.clone()).with_command("ping")
}
