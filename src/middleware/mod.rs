//! Middleware pipeline wrapped around every dispatch.
//!
//! A middleware receives the `DispatchContext` and a `Next` continuation. It may act
//! before calling `next.run(ctx)`, after it returns, or short-circuit by not calling it
//! at all, in which case the terminal handler never runs.
//!
//! Middleware is supplied either as a ready instance or as a named specification
//! (`"throttle"`, `"throttle:5,1"`) resolved through the `MiddlewareFactory`. Global
//! middleware is resolved once when added; per-route specifications are validated when
//! the route is registered and resolved again for each dispatch.

pub mod context;
pub mod factory;
pub mod logging;
pub mod rate_limit;

#[cfg(test)]
mod test;

use std::fmt;
use std::sync::Arc;

use serenity::async_trait;

use crate::{error::definition::DefinitionError, error::Result, router::RouteHandler};

pub use context::DispatchContext;
pub use factory::MiddlewareFactory;
pub use logging::LoggingMiddleware;
pub use rate_limit::{RateLimit, RateLimitStore};

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, ctx: &mut DispatchContext, next: Next<'_>) -> Result<()>;
}

/// The remainder of the chain, ending in the terminal handler.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn RouteHandler,
}

impl<'a> Next<'a> {
    pub fn new(chain: &'a [Arc<dyn Middleware>], terminal: &'a dyn RouteHandler) -> Self {
        Self { chain, terminal }
    }

    /// Runs the next middleware, or the terminal handler once the chain is exhausted.
    pub async fn run(self, ctx: &mut DispatchContext) -> Result<()> {
        match self.chain.split_first() {
            Some((middleware, rest)) => {
                middleware
                    .handle(ctx, Next::new(rest, self.terminal))
                    .await
            }
            None => self.terminal.handle(ctx).await,
        }
    }
}

/// A middleware as supplied by application code.
#[derive(Clone)]
pub enum MiddlewareSpec {
    Instance(Arc<dyn Middleware>),
    /// Resolved through the factory by name with positional string arguments.
    Named { name: String, args: Vec<String> },
}

impl MiddlewareSpec {
    /// Parses `name` or `name:arg1,arg2`.
    pub fn parse(spec: &str) -> Self {
        let (name, args) = match spec.split_once(':') {
            Some((name, args)) => (
                name,
                args.split(',')
                    .map(|arg| arg.trim().to_string())
                    .filter(|arg| !arg.is_empty())
                    .collect(),
            ),
            None => (spec, Vec::new()),
        };

        Self::Named {
            name: name.trim().to_string(),
            args,
        }
    }

    pub fn instance(middleware: impl Middleware + 'static) -> Self {
        Self::Instance(Arc::new(middleware))
    }
}

impl From<&str> for MiddlewareSpec {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}

impl fmt::Display for MiddlewareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(_) => write!(f, "<instance>"),
            Self::Named { name, args } if args.is_empty() => write!(f, "{name}"),
            Self::Named { name, args } => write!(f, "{name}:{}", args.join(",")),
        }
    }
}

impl fmt::Debug for MiddlewareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MiddlewareSpec({self})")
    }
}

/// Global middleware plus the factory used to resolve named specifications.
#[derive(Clone)]
pub struct Pipeline {
    global: Vec<Arc<dyn Middleware>>,
    factory: Arc<MiddlewareFactory>,
}

impl Pipeline {
    pub fn new(factory: MiddlewareFactory) -> Self {
        Self {
            global: Vec::new(),
            factory: Arc::new(factory),
        }
    }

    /// Adds middleware that wraps every dispatch, resolving it immediately.
    ///
    /// # Returns
    /// - `Ok(())` - Middleware appended to the global chain
    /// - `Err(DefinitionError::InvalidMiddleware)` - Unknown name or rejected arguments
    pub fn add_global(&mut self, spec: MiddlewareSpec) -> Result<(), DefinitionError> {
        let middleware = self.factory.resolve(&spec)?;
        self.global.push(middleware);
        Ok(())
    }

    /// Checks that every specification resolves without keeping the instances.
    pub fn validate(&self, specs: &[MiddlewareSpec]) -> Result<(), DefinitionError> {
        specs
            .iter()
            .try_for_each(|spec| self.factory.resolve(spec).map(|_| ()))
    }

    pub fn factory_mut(&mut self) -> &mut MiddlewareFactory {
        Arc::make_mut(&mut self.factory)
    }

    /// Runs the global chain followed by `route_specs`, then `terminal`.
    ///
    /// # Arguments
    /// - `ctx` - Context shared by the whole chain
    /// - `route_specs` - Per-route middleware, resolved now
    /// - `terminal` - Handler invoked when every middleware called `next`
    ///
    /// # Returns
    /// - `Ok(())` - Chain completed or was short-circuited by a middleware
    /// - `Err(BotError)` - A route specification no longer resolves, or a middleware or
    ///   the terminal handler failed
    pub async fn run(
        &self,
        ctx: &mut DispatchContext,
        route_specs: &[MiddlewareSpec],
        terminal: &dyn RouteHandler,
    ) -> Result<()> {
        let mut chain = self.global.clone();
        for spec in route_specs {
            chain.push(self.factory.resolve(spec)?);
        }

        Next::new(&chain, terminal).run(ctx).await
    }
}
