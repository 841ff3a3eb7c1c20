use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serenity::all::Interaction;
use tracing::{debug, error};

use crate::{
    bot::{Bot, GatewayEvent},
    model::InteractionEvent,
};

/// Routes an interaction, then notifies interaction listeners.
///
/// Pings and interaction types without routing support are ignored.
pub async fn handle_interaction(bot: &Arc<Bot>, interaction: &Interaction) {
    let Some(event) = InteractionEvent::from_interaction(interaction) else {
        debug!("Ignoring unsupported interaction {:?}", interaction.kind());
        return;
    };

    if AssertUnwindSafe(bot.handle_interaction(event.clone()))
        .catch_unwind()
        .await
        .is_err()
    {
        error!("Interaction handler panicked on '{}'", event.route_key());
    }

    bot.emit(GatewayEvent::InteractionCreate(event)).await;
}
