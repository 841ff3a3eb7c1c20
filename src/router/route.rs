use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serenity::async_trait;

use crate::{
    command::{ApplicationCommand, ChatCommand},
    error::{definition::DefinitionError, Result},
    middleware::{DispatchContext, MiddlewareSpec},
};

/// Terminal handler at the end of the middleware chain.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()>;
}

/// Closure based handler. The closure receives a copy of the context.
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> RouteHandler for FnHandler<F>
where
    F: Fn(DispatchContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        (self.0)(ctx.clone()).await
    }
}

/// Wraps a closure as a route handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(DispatchContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Invokes an application command's `handle`.
pub struct CommandHandler(pub Arc<dyn ApplicationCommand>);

#[async_trait]
impl RouteHandler for CommandHandler {
    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        self.0.handle(ctx).await
    }
}

/// Invokes an application command's `autocomplete`.
pub struct AutocompleteHandler(pub Arc<dyn ApplicationCommand>);

#[async_trait]
impl RouteHandler for AutocompleteHandler {
    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        self.0.autocomplete(ctx).await
    }
}

/// Invokes a chat command's `handle`.
pub struct ChatHandler(pub Arc<dyn ChatCommand>);

#[async_trait]
impl RouteHandler for ChatHandler {
    async fn handle(&self, ctx: &mut DispatchContext) -> Result<()> {
        self.0.handle(ctx).await
    }
}

/// A route key bound to a handler, an optional autocomplete handler and per-route
/// middleware.
#[derive(Clone)]
pub struct InteractionRoute {
    pub key: String,
    pub handler: Arc<dyn RouteHandler>,
    pub autocomplete: Option<Arc<dyn RouteHandler>>,
    pub middleware: Vec<MiddlewareSpec>,
    pub admin_only: bool,
}

impl InteractionRoute {
    pub fn new(key: impl Into<String>, handler: Arc<dyn RouteHandler>) -> Self {
        Self {
            key: key.into(),
            handler,
            autocomplete: None,
            middleware: Vec::new(),
            admin_only: false,
        }
    }

    pub fn autocomplete(mut self, handler: Arc<dyn RouteHandler>) -> Self {
        self.autocomplete = Some(handler);
        self
    }

    pub fn middleware(mut self, spec: impl Into<MiddlewareSpec>) -> Self {
        self.middleware.push(spec.into());
        self
    }

    pub fn admin_only(mut self, admin_only: bool) -> Self {
        self.admin_only = admin_only;
        self
    }

    /// Prefixes the key with `{prefix}@`.
    pub fn namespaced(mut self, prefix: &str) -> Self {
        self.key = format!("{prefix}@{}", self.key);
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.key.contains('{')
    }

    /// Prefix compared against the identifier prefix, e.g. `vote` for `vote:{id}`.
    pub fn dynamic_prefix(&self) -> &str {
        let end = self.key.find('{').unwrap_or(self.key.len());
        self.key[..end].trim_end_matches(':')
    }

    /// Declared placeholders in order, as `(name, optional)`.
    pub fn parameters(&self) -> Vec<(String, bool)> {
        placeholders(&self.key)
            .into_iter()
            .map(|placeholder| match placeholder.strip_suffix('?') {
                Some(name) => (name.to_string(), true),
                None => (placeholder.to_string(), false),
            })
            .collect()
    }

    /// Checks the key shape.
    ///
    /// # Returns
    /// - `Ok(())` - Key is a non-empty static key, or a dynamic key whose placeholders
    ///   are named, closed and follow a `:` separated prefix
    /// - `Err(DefinitionError::InvalidRoute)` - Otherwise
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let invalid = |reason: &str| DefinitionError::invalid_route(&self.key, reason);

        if self.key.trim().is_empty() {
            return Err(invalid("route key is empty"));
        }
        if !self.is_dynamic() {
            if self.key.contains('}') {
                return Err(invalid("unbalanced placeholder braces"));
            }
            return Ok(());
        }

        let opened = self.key.matches('{').count();
        if opened != self.key.matches('}').count() || opened != placeholders(&self.key).len() {
            return Err(invalid("unbalanced placeholder braces"));
        }
        let head = &self.key[..self.key.find('{').unwrap_or(0)];
        if !head.ends_with(':') || self.dynamic_prefix().is_empty() {
            return Err(invalid("placeholders must follow a ':' separated prefix"));
        }
        if self
            .parameters()
            .iter()
            .any(|(name, _)| name.is_empty() || name.contains(['{', ':']))
        {
            return Err(invalid("placeholder names must be non-empty"));
        }

        Ok(())
    }
}

impl fmt::Debug for InteractionRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionRoute")
            .field("key", &self.key)
            .field("has_autocomplete", &self.autocomplete.is_some())
            .field("middleware", &self.middleware)
            .field("admin_only", &self.admin_only)
            .finish()
    }
}

/// Text between each `{` and the following `}`.
fn placeholders(key: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = key;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        found.push(&after[..end]);
        rest = &after[end + 1..];
    }

    found
}
