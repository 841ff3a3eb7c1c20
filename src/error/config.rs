use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set.
    ///
    /// The bot requires this environment variable to be defined. Check the
    /// `.env.example` file for required configuration variables.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// A configured command prefix is empty or contains whitespace.
    #[error("Invalid command prefix '{0}': prefixes must be non-empty and contain no whitespace")]
    InvalidPrefix(String),

    /// The HTTP server address could not be parsed as `host:port`.
    #[error("Invalid HTTP server address '{address}': {reason}")]
    InvalidHttpAddress {
        /// The raw address value from the environment
        address: String,
        /// Why the address was rejected
        reason: String,
    },

    /// A configuration value could not be parsed into the expected type.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue {
        /// Environment variable name
        key: String,
        /// The raw value that failed to parse
        value: String,
    },
}
