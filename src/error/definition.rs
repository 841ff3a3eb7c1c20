use thiserror::Error;

/// Programming mistakes detected while registering commands, routes or middleware.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DefinitionError {
    /// A command or context menu definition does not satisfy Discord's constraints or
    /// was registered under the wrong kind.
    #[error("Invalid command definition '{name}': {reason}")]
    InvalidDefinition {
        /// Name of the offending definition
        name: String,
        /// Why the definition was rejected
        reason: String,
    },

    /// A middleware specification does not resolve to a known middleware, or its
    /// arguments are rejected by the middleware constructor.
    #[error("Invalid middleware '{spec}': {reason}")]
    InvalidMiddleware {
        /// The middleware specification as supplied, e.g. `throttle:5,1`
        spec: String,
        /// Why the specification was rejected
        reason: String,
    },

    /// An interaction route key is malformed.
    #[error("Invalid interaction route '{route}': {reason}")]
    InvalidRoute {
        /// The route key as supplied
        route: String,
        /// Why the route was rejected
        reason: String,
    },

    /// A discovered identifier has no constructor in the command catalog.
    #[error("No catalog entry for '{0}'")]
    UnknownCatalogEntry(String),
}

impl DefinitionError {
    pub fn invalid_definition(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_middleware(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMiddleware {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_route(route: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            route: route.into(),
            reason: reason.into(),
        }
    }
}
