//! Inbound dispatch: chat messages and interactions into the middleware pipeline.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use crate::{
    bot::Bot,
    command::{parse, strip_prefix},
    gateway::Responder,
    middleware::{DispatchContext, MiddlewareSpec},
    model::{ChatMessage, InteractionData, InteractionEvent, Reply, Source},
    router::{ChatHandler, RouteHandler, RouteResolution},
};

/// What happened to one inbound trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The pipeline ran, whether or not a middleware short-circuited it.
    Handled,
    /// Not meant for the bot: self-authored, no prefix, unknown command, or the
    /// relevant boot stage has not completed yet.
    Ignored,
    NoRoute,
    /// A template route matched without a required parameter.
    MissingParameter,
    /// Admin-only command invoked by a non-admin.
    Denied,
    /// The pipeline returned an error, which was logged.
    Failed,
}

impl Bot {
    /// Dispatches a chat message to the matching chat command.
    pub async fn handle_message(self: &Arc<Self>, message: ChatMessage) -> DispatchOutcome {
        if !self.flags.commands_registered.load(Ordering::SeqCst) {
            return DispatchOutcome::Ignored;
        }

        let bot_user = self.bot_user();
        if bot_user == Some(message.author_id) {
            return DispatchOutcome::Ignored;
        }

        let guild_prefix = message
            .guild_id
            .and_then(|guild_id| self.guild_prefix(guild_id));
        let Some(parsed) = strip_prefix(
            &message.content,
            &self.config.prefixes,
            bot_user,
            guild_prefix.as_deref(),
        )
        .and_then(parse) else {
            return DispatchOutcome::Ignored;
        };

        let command = self.registry().lookup_chat(&parsed.name);
        let Some(command) = command else {
            return DispatchOutcome::Ignored;
        };

        if command.admin_only() && !self.gate().is_admin(message.author_id).await {
            debug!(
                "Dropping admin command '{}' from {}",
                command.name(),
                message.author_id
            );
            return DispatchOutcome::Denied;
        }

        let Some(responder) = self.responder() else {
            warn!("No responder set, dropping chat command '{}'", parsed.name);
            return DispatchOutcome::Ignored;
        };

        let mut ctx = DispatchContext::new(Source::Message(message), responder)
            .with_command(command.name())
            .with_args(parsed.args);
        let terminal = ChatHandler(command);

        self.run_pipeline(&mut ctx, &[], &terminal).await
    }

    /// Dispatches an interaction through the interaction router.
    pub async fn handle_interaction(self: &Arc<Self>, event: InteractionEvent) -> DispatchOutcome {
        if !self.flags.interactions_registered.load(Ordering::SeqCst) {
            return DispatchOutcome::Ignored;
        }

        let key = event.route_key();
        let autocomplete = event.is_autocomplete();
        let resolution = self.router_resolve(&key, !autocomplete);

        let (route, params) = match resolution {
            RouteResolution::Matched { route, params } => (route, params),
            RouteResolution::MissingParameter { route, param } => {
                error!(
                    "Missing required parameter '{}' for route '{}' (identifier '{}')",
                    param, route.key, key
                );
                return DispatchOutcome::MissingParameter;
            }
            RouteResolution::NoMatch => {
                debug!("No route for interaction '{}'", key);
                return DispatchOutcome::NoRoute;
            }
        };

        let handler = if autocomplete {
            match route.autocomplete.clone() {
                Some(handler) => handler,
                None => return DispatchOutcome::NoRoute,
            }
        } else {
            route.handler.clone()
        };

        let Some(responder) = self.responder() else {
            warn!("No responder set, dropping interaction '{}'", key);
            return DispatchOutcome::Ignored;
        };

        if route.admin_only && !self.gate().is_admin(event.user_id).await {
            if !autocomplete {
                let source = Source::Interaction(event);
                if let Err(e) = responder
                    .reply(&source, Reply::new("Permission Denied").ephemeral())
                    .await
                {
                    error!("Failed to send permission denial for '{}': {}", key, e);
                }
            }
            return DispatchOutcome::Denied;
        }

        let mut ctx = interaction_context(event, responder).with_args(params);

        self.run_pipeline(&mut ctx, &route.middleware, handler.as_ref())
            .await
    }

    async fn run_pipeline(
        &self,
        ctx: &mut DispatchContext,
        route_middleware: &[MiddlewareSpec],
        terminal: &dyn RouteHandler,
    ) -> DispatchOutcome {
        let pipeline = self.pipeline();

        match pipeline.run(ctx, route_middleware, terminal).await {
            Ok(()) => DispatchOutcome::Handled,
            Err(e) => {
                error!(
                    "Handler for {} '{}' failed: {}",
                    ctx.source.kind_name(),
                    ctx.command.as_deref().unwrap_or("-"),
                    e
                );
                DispatchOutcome::Failed
            }
        }
    }

    fn router_resolve(&self, identifier: &str, check_params: bool) -> RouteResolution {
        super::read(&self.router).resolve(identifier, check_params)
    }
}

/// Context carrying the command name, options and target of an interaction.
fn interaction_context(
    event: InteractionEvent,
    responder: Arc<dyn Responder>,
) -> DispatchContext {
    let (command, options, target) = match &event.data {
        InteractionData::Command {
            name,
            options,
            target_id,
            ..
        } => (
            Some(name.clone()),
            options.clone(),
            target_id.map(|id| Value::String(id.to_string())),
        ),
        InteractionData::Autocomplete {
            name,
            options,
            focused,
            ..
        } => (
            Some(name.clone()),
            options.clone(),
            focused
                .as_ref()
                .map(|focused| json!({ "name": focused.name, "value": focused.value })),
        ),
        InteractionData::Component { values, .. } => (
            None,
            Map::new(),
            (!values.is_empty()).then(|| json!(values)),
        ),
        InteractionData::Modal { fields, .. } => (
            None,
            fields
                .iter()
                .map(|(id, value)| (id.clone(), Value::String(value.clone())))
                .collect(),
            None,
        ),
    };

    let mut ctx = DispatchContext::new(Source::Interaction(event), responder);
    ctx.command = command;
    ctx.options = options;
    ctx.target = target;
    ctx
}
