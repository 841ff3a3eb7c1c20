use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serenity::all::Message;
use tracing::error;

use crate::{
    bot::{Bot, GatewayEvent},
    model::ChatMessage,
};

/// Dispatches a chat command, then notifies message listeners.
///
/// A panicking command is logged and never reaches the gateway connection.
pub async fn handle_message(bot: &Arc<Bot>, message: &Message) {
    let chat = ChatMessage::from(message);

    if AssertUnwindSafe(bot.handle_message(chat.clone()))
        .catch_unwind()
        .await
        .is_err()
    {
        error!("Chat command handler panicked on message {}", chat.id);
    }

    bot.emit(GatewayEvent::Message(chat)).await;
}
