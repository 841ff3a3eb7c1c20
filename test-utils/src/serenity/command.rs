//! Test factory for Serenity application `Command` objects.

use serenity::model::application::Command;

use crate::fixture::attributes;

/// Creates a Serenity `Command` as returned by Discord's command endpoints.
///
/// # Arguments
/// - `id` - Command id (snowflake)
/// - `name` - Command name
/// - `description` - Command description
/// - `guild_id` - Guild the command belongs to, `None` for global commands
///
/// # Returns
/// - `Command` - A valid Serenity command
///
/// # Panics
/// - If the fixture JSON cannot be deserialized (indicates invalid test data)
pub fn create_test_command(
    id: u64,
    name: &str,
    description: &str,
    guild_id: Option<u64>,
) -> Command {
    let guild_id = guild_id.map(|id| id.to_string());
    let payload = attributes::command(id, name, description, guild_id.as_deref());

    serde_json::from_value(payload).expect("Failed to create test command")
}
