//! Application command payloads as Discord returns them.

use serde_json::{json, Value};

/// Default application id carried by every fixture.
pub const APPLICATION_ID: &str = "900000000000000001";

/// Default guild id used by guild scoped fixtures.
pub const GUILD_ID: &str = "100";

/// Raw command payload with server managed fields filled in.
///
/// # Arguments
/// - `id` - Command id (snowflake)
/// - `name` - Command name
/// - `description` - Command description
/// - `guild_id` - Guild the command is scoped to, `None` for global commands
///
/// # Returns
/// - `Value` - A JSON object matching Discord's application command shape
pub fn command(id: u64, name: &str, description: &str, guild_id: Option<&str>) -> Value {
    let mut payload = json!({
        "id": id.to_string(),
        "application_id": APPLICATION_ID,
        "version": "1",
        "type": 1,
        "name": name,
        "name_localizations": null,
        "description": description,
        "description_localizations": null,
        "options": [],
        "default_member_permissions": null,
        "nsfw": false,
    });

    match guild_id {
        Some(guild_id) => payload["guild_id"] = json!(guild_id),
        None => payload["dm_permission"] = json!(true),
    }

    payload
}

/// Global `ping` command matching `CommandDefinition::slash("ping", "Check latency")`.
pub fn ping() -> Value {
    command(1, "ping", "Check latency", None)
}

/// `ping` with shuffled keys and numbers sent as strings.
pub fn ping_reordered() -> Value {
    json!({
        "nsfw": false,
        "options": [],
        "dm_permission": true,
        "description": "Check latency",
        "name": "ping",
        "type": "1",
        "version": "7",
        "id": "1",
    })
}

/// Guild scoped `kick` command.
pub fn kick() -> Value {
    command(2, "kick", "Kick a member", Some(GUILD_ID))
}
