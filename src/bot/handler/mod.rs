//! Serenity event handler bridging gateway events into the bot.

use std::sync::Arc;

use serenity::all::{Context, EventHandler, Guild, Interaction, Message, Ready, UnavailableGuild};
use serenity::async_trait;

use crate::{bot::Bot, gateway::discord::GuildSet};

pub mod guild;
pub mod interaction;
pub mod message;
pub mod ready;

pub struct Handler {
    pub bot: Arc<Bot>,
    /// Guilds visible to this connection, shared with the command gateway.
    pub guilds: GuildSet,
}

impl Handler {
    pub fn new(bot: Arc<Bot>, guilds: GuildSet) -> Self {
        Self { bot, guilds }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(&self.bot, &self.guilds, ctx, ready).await;
    }

    /// Called when a guild becomes available or the bot joins a new guild
    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        guild::handle_guild_create(&self.bot, &self.guilds, guild.id).await;
    }

    /// Called when the bot leaves a guild or it becomes unavailable
    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        guild::handle_guild_delete(&self.bot, &self.guilds, incomplete.id).await;
    }

    /// Called when a message is sent in a channel
    async fn message(&self, _ctx: Context, message: Message) {
        message::handle_message(&self.bot, &message).await;
    }

    /// Called for commands, autocomplete, components and modal submissions
    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.bot, &interaction).await;
    }
}
