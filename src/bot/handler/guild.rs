use std::sync::Arc;

use serenity::all::GuildId;
use tracing::debug;

use crate::{
    bot::{Bot, GatewayEvent},
    gateway::discord::GuildSet,
};

/// Adds the guild to the set used to resolve guild scoped commands.
pub async fn handle_guild_create(bot: &Arc<Bot>, guilds: &GuildSet, guild_id: GuildId) {
    if guilds.write().await.insert(guild_id) {
        debug!("Guild {} became available", guild_id);
    }

    bot.emit(GatewayEvent::GuildCreate(guild_id)).await;
}

pub async fn handle_guild_delete(bot: &Arc<Bot>, guilds: &GuildSet, guild_id: GuildId) {
    if guilds.write().await.remove(&guild_id) {
        debug!("Guild {} is no longer available", guild_id);
    }

    bot.emit(GatewayEvent::GuildDelete(guild_id)).await;
}
