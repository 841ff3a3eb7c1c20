//! Interaction routing table.
//!
//! Routes are keyed either by a literal identifier (a custom id, or a command path such
//! as `settings@roles@add`) or by a template such as `vote:{poll}:{choice?}`. Templates
//! match identifiers of the form `prefix:value1:value2` and hand the values to the
//! handler positionally.
//!
//! An exact static match always wins. Among templates, the first registered route whose
//! prefix matches is used.

pub mod route;

#[cfg(test)]
mod test;

use std::collections::HashMap;

use tracing::warn;

use crate::error::definition::DefinitionError;

pub use route::{
    handler_fn, AutocompleteHandler, ChatHandler, CommandHandler, FnHandler, InteractionRoute,
    RouteHandler,
};

/// Result of looking up an identifier.
#[derive(Debug)]
pub enum RouteResolution {
    Matched {
        route: InteractionRoute,
        /// Positional values taken from the identifier. Empty for static routes.
        params: Vec<String>,
    },
    /// A template matched but a required parameter slot was missing or empty.
    MissingParameter {
        route: InteractionRoute,
        param: String,
    },
    NoMatch,
}

#[derive(Default)]
pub struct InteractionRouter {
    routes: Vec<InteractionRoute>,
    index: HashMap<String, usize>,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route, replacing any route with the exact same key in place.
    ///
    /// # Returns
    /// - `Ok(())` - Route stored
    /// - `Err(DefinitionError::InvalidRoute)` - The key is malformed
    pub fn add(&mut self, route: InteractionRoute) -> Result<(), DefinitionError> {
        route.validate()?;

        match self.index.get(&route.key) {
            Some(&position) => {
                warn!("Replacing interaction route '{}'", route.key);
                self.routes[position] = route;
            }
            None => {
                self.index.insert(route.key.clone(), self.routes.len());
                self.routes.push(route);
            }
        }

        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&InteractionRoute> {
        self.index.get(key).map(|&position| &self.routes[position])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.key.as_str())
    }

    /// Finds the route for an inbound identifier.
    ///
    /// # Arguments
    /// - `identifier` - Custom id or command route key of the interaction
    /// - `check_params` - Whether required template parameters must be present.
    ///   Autocomplete lookups pass `false`
    ///
    /// # Returns
    /// - `RouteResolution::Matched` - Static match, or template match with its parameters
    /// - `RouteResolution::MissingParameter` - Template matched without a required value
    /// - `RouteResolution::NoMatch` - Nothing matched
    pub fn resolve(&self, identifier: &str, check_params: bool) -> RouteResolution {
        if let Some(route) = self.get(identifier).filter(|route| !route.is_dynamic()) {
            return RouteResolution::Matched {
                route: route.clone(),
                params: Vec::new(),
            };
        }

        let (prefix, values): (&str, Vec<String>) = match identifier.split_once(':') {
            Some((prefix, rest)) => (prefix, rest.split(':').map(str::to_string).collect()),
            None => (identifier, Vec::new()),
        };

        let Some(route) = self
            .routes
            .iter()
            .filter(|route| route.is_dynamic())
            .find(|route| route.dynamic_prefix() == prefix)
        else {
            return RouteResolution::NoMatch;
        };

        if check_params {
            let missing = route
                .parameters()
                .into_iter()
                .enumerate()
                .find(|(slot, (_, optional))| {
                    !optional && values.get(*slot).map_or(true, String::is_empty)
                });

            if let Some((_, (param, _))) = missing {
                return RouteResolution::MissingParameter {
                    route: route.clone(),
                    param,
                };
            }
        }

        RouteResolution::Matched {
            route: route.clone(),
            params: values,
        }
    }
}
