use std::sync::Arc;

use crate::{
    error::definition::DefinitionError,
    router::{handler_fn, InteractionRoute, InteractionRouter, RouteHandler, RouteResolution},
};


fn noop() -> Arc<dyn RouteHandler> {
    handler_fn(|_| async { Ok(()) })
}

fn route(key: &str) -> InteractionRoute {
    InteractionRoute::new(key, noop())
}

/// Key of the matched route, or a marker for the other outcomes.
fn matched_key(resolution: &RouteResolution) -> &str {
    match resolution {
        RouteResolution::Matched { route, .. } => &route.key,
        RouteResolution::MissingParameter { .. } => "<missing>",
        RouteResolution::NoMatch => "<none>",
    }
}
