//! Ready event: seeds the guild set, wires the Discord collaborators and boots.

use std::sync::Arc;

use serenity::all::{Context, GuildId, Ready};
use tracing::{error, info};

use crate::{
    bot::{Bot, GatewayEvent},
    gateway::discord::{GuildSet, SerenityGateway, SerenityResponder},
};

/// Handles the ready event when the bot connects to Discord.
///
/// Boot failures abort the run loop through the bot's control handle.
///
/// # Arguments
/// - `bot` - The bot to boot
/// - `guilds` - Guild set of this connection, replaced by the guilds listed in `ready`
/// - `ctx` - Discord context providing the HTTP client
/// - `ready` - Ready payload with the bot user and its guilds
pub async fn handle_ready(bot: &Arc<Bot>, guilds: &GuildSet, ctx: Context, ready: Ready) {
    info!("{} is connected to Discord", ready.user.name);

    let guild_ids: Vec<GuildId> = ready.guilds.iter().map(|guild| guild.id).collect();
    {
        let mut known = guilds.write().await;
        known.clear();
        known.extend(guild_ids.iter().copied());
    }

    bot.set_bot_user(ready.user.id);
    bot.set_responder(Arc::new(SerenityResponder::new(ctx.http.clone())));

    let gateway = Arc::new(SerenityGateway::new(ctx.http.clone(), guilds.clone()));
    if let Err(e) = bot.boot(gateway).await {
        error!("Boot failed: {}", e);
        bot.handle().abort(e.to_string());
        return;
    }

    bot.emit(GatewayEvent::Ready {
        user_id: ready.user.id,
        guilds: guild_ids,
    })
    .await;
}
