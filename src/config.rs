//! Environment-based bot configuration.
//!
//! Values are read from the process environment after `dotenvy` has loaded any `.env`
//! file. Configuration errors are fatal at boot.

use std::net::SocketAddr;

use serenity::all::UserId;

use crate::{
    error::{config::ConfigError, BotError},
    middleware::rate_limit::decay_from_minutes,
};

/// Prefix list entry that mentions the bot instead of using literal text.
pub const MENTION_PREFIX: &str = "@mention";
/// Prefix list entry that resolves to the per-guild prefix table.
pub const GUILD_PREFIX: &str = "@guild";

const DEFAULT_BOT_NAME: &str = "switchboard";
const DEFAULT_PREFIX: &str = "!";
const DEFAULT_RATE_LIMIT_MAX_ATTEMPTS: u32 = 60;
const DEFAULT_RATE_LIMIT_DECAY_MINUTES: u64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

/// A chat command prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    /// Literal text the message must start with, e.g. `!`.
    Literal(String),
    /// A mention of the bot user (`<@id>` or `<@!id>`).
    Mention,
    /// The prefix configured for the guild the message was sent in.
    Guild,
}

impl Prefix {
    /// Parses a single prefix list entry.
    ///
    /// # Arguments
    /// - `value` - Raw prefix entry; `@mention` and `@guild` are sentinels
    ///
    /// # Returns
    /// - `Ok(Prefix)` - Parsed prefix
    /// - `Err(ConfigError::InvalidPrefix)` - Entry is empty or contains whitespace
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            MENTION_PREFIX => Ok(Self::Mention),
            GUILD_PREFIX => Ok(Self::Guild),
            literal if literal.is_empty() || literal.chars().any(char::is_whitespace) => {
                Err(ConfigError::InvalidPrefix(literal.to_string()))
            }
            literal => Ok(Self::Literal(literal.to_string())),
        }
    }
}

/// Rate limit defaults applied by the built-in `throttle` middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Attempts allowed per window.
    pub max_attempts: u32,
    /// Window length in minutes.
    pub decay_minutes: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
            decay_minutes: DEFAULT_RATE_LIMIT_DECAY_MINUTES,
        }
    }
}

pub struct Config {
    pub name: String,
    pub discord_token: String,
    pub prefixes: Vec<Prefix>,
    /// Statically configured admins. When empty the persisted per-user flag decides.
    pub admins: Vec<UserId>,
    pub http_address: Option<SocketAddr>,
    pub rate_limit: RateLimitConfig,
    pub log_level: String,
}

impl Config {
    /// Creates a configuration with defaults for everything but the token.
    ///
    /// # Arguments
    /// - `discord_token` - Bot token used to connect to the gateway
    ///
    /// # Returns
    /// - `Config` with the `!` prefix, no admins, no HTTP server and default rate limits
    pub fn new(discord_token: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_BOT_NAME.to_string(),
            discord_token: discord_token.into(),
            prefixes: vec![Prefix::Literal(DEFAULT_PREFIX.to_string())],
            admins: Vec::new(),
            http_address: None,
            rate_limit: RateLimitConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Loads the configuration from environment variables.
    ///
    /// # Returns
    /// - `Ok(Config)` - All required variables present and valid
    /// - `Err(BotError::ConfigErr)` - Missing token, invalid prefix, admin id, rate limit
    ///   value or HTTP address
    pub fn from_env() -> Result<Self, BotError> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("DISCORD_TOKEN".to_string()))?;

        let mut config = Self::new(discord_token);

        if let Ok(name) = std::env::var("BOT_NAME") {
            config.name = name;
        }
        if let Ok(prefixes) = std::env::var("BOT_PREFIXES") {
            config.prefixes = parse_prefixes(&prefixes)?;
        }
        if let Ok(admins) = std::env::var("BOT_ADMINS") {
            config.admins = parse_admins(&admins)?;
        }
        if let Ok(address) = std::env::var("HTTP_ADDRESS") {
            config.http_address = parse_http_address(&address)?;
        }
        if let Ok(value) = std::env::var("RATE_LIMIT_MAX_ATTEMPTS") {
            config.rate_limit.max_attempts = parse_number("RATE_LIMIT_MAX_ATTEMPTS", &value)?;
        }
        if let Ok(value) = std::env::var("RATE_LIMIT_DECAY_MINUTES") {
            config.rate_limit.decay_minutes = parse_decay_minutes(&value)?;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }
}

/// Parses a comma separated prefix list.
pub fn parse_prefixes(value: &str) -> Result<Vec<Prefix>, ConfigError> {
    value.split(',').map(|p| Prefix::parse(p.trim())).collect()
}

/// Parses a comma separated list of admin user ids. Blank entries are skipped.
pub fn parse_admins(value: &str) -> Result<Vec<UserId>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .map(UserId::new)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "BOT_ADMINS".to_string(),
                    value: id.to_string(),
                })
        })
        .collect()
}

/// Parses the optional HTTP address. A blank value disables the HTTP server.
pub fn parse_http_address(value: &str) -> Result<Option<SocketAddr>, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse::<SocketAddr>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidHttpAddress {
            address: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parses the throttle decay, rejecting zero and windows longer than a week.
pub fn parse_decay_minutes(value: &str) -> Result<u64, ConfigError> {
    let minutes: u64 = parse_number("RATE_LIMIT_DECAY_MINUTES", value)?;

    decay_from_minutes(minutes).map_err(|_| ConfigError::InvalidValue {
        key: "RATE_LIMIT_DECAY_MINUTES".to_string(),
        value: value.to_string(),
    })?;

    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_and_sentinel_prefixes() {
        let prefixes = parse_prefixes("!, @mention,@guild,sb.").unwrap();

        assert_eq!(
            prefixes,
            vec![
                Prefix::Literal("!".to_string()),
                Prefix::Mention,
                Prefix::Guild,
                Prefix::Literal("sb.".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_empty_prefix() {
        let result = parse_prefixes("!,,?");

        assert!(matches!(result, Err(ConfigError::InvalidPrefix(p)) if p.is_empty()));
    }

    #[test]
    fn parses_admin_ids() {
        let admins = parse_admins("123, 456,").unwrap();

        assert_eq!(admins, vec![UserId::new(123), UserId::new(456)]);
    }

    #[test]
    fn rejects_non_numeric_admin_id() {
        let result = parse_admins("123,abc");

        assert!(matches!(result, Err(ConfigError::InvalidValue { value, .. }) if value == "abc"));
    }

    #[test]
    fn blank_http_address_disables_server() {
        assert_eq!(parse_http_address("  ").unwrap(), None);
    }

    #[test]
    fn parses_http_address() {
        let address = parse_http_address("127.0.0.1:8080").unwrap();

        assert_eq!(address, Some("127.0.0.1:8080".parse().unwrap()));
    }

    #[test]
    fn rejects_http_address_without_port() {
        let result = parse_http_address("localhost");

        assert!(matches!(result, Err(ConfigError::InvalidHttpAddress { .. })));
    }

    #[test]
    fn parses_decay_minutes_within_bounds() {
        assert_eq!(parse_decay_minutes("5").unwrap(), 5);
    }

    #[test]
    fn rejects_unbounded_decay_minutes() {
        for value in ["0", "10081", "400000000000000000"] {
            let result = parse_decay_minutes(value);

            assert!(
                matches!(&result, Err(ConfigError::InvalidValue { value: v, .. }) if v == value),
                "{value} should be rejected"
            );
        }
    }
}
