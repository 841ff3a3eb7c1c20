use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::RateLimitConfig,
    error::definition::DefinitionError,
    middleware::{
        logging::LoggingMiddleware,
        rate_limit::{decay_from_minutes, RateLimit, RateLimitStore},
        Middleware, MiddlewareSpec,
    },
};

type Constructor =
    Arc<dyn Fn(&[String]) -> Result<Arc<dyn Middleware>, String> + Send + Sync>;

/// Maps middleware names to constructors taking positional string arguments.
#[derive(Clone, Default)]
pub struct MiddlewareFactory {
    constructors: HashMap<String, Constructor>,
}

impl MiddlewareFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with `throttle` and `logging` registered.
    ///
    /// Every `throttle` instance shares one attempt store, so a throttle resolved per
    /// dispatch keeps counting across dispatches. Counters are keyed by limit and decay,
    /// so a global and a route throttle never count the same dispatch twice.
    ///
    /// # Arguments
    /// - `defaults` - Limits used when `throttle` is named without arguments
    pub fn with_builtins(defaults: RateLimitConfig) -> Self {
        let store = Arc::new(RateLimitStore::new());
        let mut factory = Self::new();

        factory.register("throttle", move |args| {
            let max_attempts = match args.first() {
                Some(value) => value
                    .parse::<u32>()
                    .map_err(|_| format!("max attempts '{value}' is not a number"))?,
                None => defaults.max_attempts,
            };
            let decay_minutes = match args.get(1) {
                Some(value) => value
                    .parse::<u64>()
                    .map_err(|_| format!("decay minutes '{value}' is not a number"))?,
                None => defaults.decay_minutes,
            };
            if args.len() > 2 {
                return Err("expected at most two arguments".to_string());
            }

            let decay = decay_from_minutes(decay_minutes)?;

            Ok(Arc::new(RateLimit::new(store.clone(), max_attempts, decay)))
        });

        factory.register("logging", |args| {
            if !args.is_empty() {
                return Err("takes no arguments".to_string());
            }
            Ok(Arc::new(LoggingMiddleware))
        });

        factory
    }

    /// Registers or replaces a named constructor.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&[String]) -> Result<Arc<dyn Middleware>, String> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Resolves a specification into a middleware instance.
    ///
    /// # Returns
    /// - `Ok(Arc<dyn Middleware>)` - The instance, or a freshly constructed named middleware
    /// - `Err(DefinitionError::InvalidMiddleware)` - The name is unknown or the
    ///   constructor rejected the arguments
    pub fn resolve(&self, spec: &MiddlewareSpec) -> Result<Arc<dyn Middleware>, DefinitionError> {
        match spec {
            MiddlewareSpec::Instance(middleware) => Ok(middleware.clone()),
            MiddlewareSpec::Named { name, args } => {
                let constructor = self.constructors.get(name).ok_or_else(|| {
                    DefinitionError::invalid_middleware(spec.to_string(), "no middleware with this name")
                })?;

                constructor(args)
                    .map_err(|reason| DefinitionError::invalid_middleware(spec.to_string(), reason))
            }
        }
    }
}
