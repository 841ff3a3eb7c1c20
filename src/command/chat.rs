use serenity::all::UserId;

use crate::config::Prefix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Strips the first configured prefix the message starts with.
///
/// # Arguments
/// - `content` - Raw message content
/// - `prefixes` - Configured prefixes in priority order
/// - `bot_id` - The bot's user id, needed for the mention prefix
/// - `guild_prefix` - Prefix configured for the message's guild, if any
///
/// # Returns
/// - `Some(&str)` - Content after the prefix, leading whitespace removed
/// - `None` - No prefix matched
pub fn strip_prefix<'a>(
    content: &'a str,
    prefixes: &[Prefix],
    bot_id: Option<UserId>,
    guild_prefix: Option<&str>,
) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| {
        let rest = match prefix {
            Prefix::Literal(literal) => content.strip_prefix(literal.as_str()),
            Prefix::Guild => guild_prefix
                .filter(|p| !p.is_empty())
                .and_then(|p| content.strip_prefix(p)),
            Prefix::Mention => bot_id.and_then(|id| {
                content
                    .strip_prefix(&format!("<@{id}>"))
                    .or_else(|| content.strip_prefix(&format!("<@!{id}>")))
            }),
        }?;

        Some(rest.trim_start())
    })
}

/// Splits prefix-stripped content into a command name and positional arguments.
pub fn parse(rest: &str) -> Option<ParsedCommand> {
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_string();

    Some(ParsedCommand {
        name,
        args: tokens.map(str::to_string).collect(),
    })
}
