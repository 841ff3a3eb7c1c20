use std::time::Instant;

use serenity::async_trait;
use tracing::{info, warn};

use crate::{
    error::Result,
    middleware::{DispatchContext, Middleware, Next},
};

/// Logs every dispatch with its outcome and duration.
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(&self, ctx: &mut DispatchContext, next: Next<'_>) -> Result<()> {
        let started = Instant::now();
        let user_id = ctx.user_id();
        let source = ctx.source.kind_name();
        let command = ctx.command.clone().unwrap_or_default();

        info!(user_id = %user_id, source, command = %command, "Dispatch received");

        let result = next.run(ctx).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => info!(user_id = %user_id, command = %command, elapsed_ms, "Dispatch completed"),
            Err(e) => warn!(user_id = %user_id, command = %command, elapsed_ms, "Dispatch failed: {}", e),
        }

        result
    }
}
