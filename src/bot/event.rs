//! Gateway event listeners.
//!
//! Listeners subscribe to a closed set of event kinds. Every emitted event is delivered
//! to each subscribed listener in registration order; a listener error or panic is
//! logged and does not affect the others.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serenity::{
    all::{GuildId, UserId},
    async_trait,
};
use tracing::error;

use crate::{
    bot::Bot,
    error::Result,
    model::{ChatMessage, InteractionEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    Message,
    InteractionCreate,
    GuildCreate,
    GuildDelete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    Ready { user_id: UserId, guilds: Vec<GuildId> },
    Message(ChatMessage),
    InteractionCreate(InteractionEvent),
    GuildCreate(GuildId),
    GuildDelete(GuildId),
}

impl GatewayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Ready { .. } => EventKind::Ready,
            Self::Message(_) => EventKind::Message,
            Self::InteractionCreate(_) => EventKind::InteractionCreate,
            Self::GuildCreate(_) => EventKind::GuildCreate,
            Self::GuildDelete(_) => EventKind::GuildDelete,
        }
    }
}

#[async_trait]
pub trait EventListener: Send + Sync {
    fn name(&self) -> &str;

    /// Event kinds delivered to `handle`. Must not be empty.
    fn events(&self) -> Vec<EventKind>;

    async fn handle(&self, bot: Arc<Bot>, event: &GatewayEvent) -> Result<()>;
}

impl Bot {
    /// Delivers `event` to every subscribed listener once events are registered.
    pub(crate) async fn emit(self: &Arc<Self>, event: GatewayEvent) {
        if !self.events_registered() {
            return;
        }

        let kind = event.kind();
        let listeners: Vec<Arc<dyn EventListener>> = self
            .listeners()
            .into_iter()
            .filter(|listener| listener.events().contains(&kind))
            .collect();

        for listener in listeners {
            match AssertUnwindSafe(listener.handle(self.clone(), &event))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Event listener '{}' failed on {:?}: {}", listener.name(), kind, e),
                Err(_) => error!("Event listener '{}' panicked on {:?}", listener.name(), kind),
            }
        }
    }
}
