use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serenity::async_trait;
use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

use crate::{
    error::Result,
    middleware::{DispatchContext, Middleware, Next},
    model::Reply,
};

/// Longest decay window a throttle accepts, one week.
pub const MAX_DECAY_MINUTES: u64 = 7 * 24 * 60;

/// Converts a decay given in minutes into a window length.
///
/// # Returns
/// - `Ok(Duration)` - The window length
/// - `Err(String)` - Zero, or longer than `MAX_DECAY_MINUTES`
pub fn decay_from_minutes(minutes: u64) -> std::result::Result<Duration, String> {
    if minutes == 0 || minutes > MAX_DECAY_MINUTES {
        return Err(format!(
            "decay minutes must be between 1 and {MAX_DECAY_MINUTES}, got {minutes}"
        ));
    }

    Ok(Duration::from_secs(minutes * 60))
}

struct Window {
    attempts: u32,
    resets_at: Instant,
}

/// Attempt counters with a fixed decay window per key.
#[derive(Default)]
pub struct RateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one attempt for `key` unless its window is already used up.
    ///
    /// Opening a window for a new key drops every expired window.
    ///
    /// # Returns
    /// - `Ok(attempts)` - Attempts counted in the current window, including this one
    /// - `Err(Duration)` - `max_attempts` already reached, time until the window resets
    pub async fn attempt(
        &self,
        key: &str,
        max_attempts: u32,
        decay: Duration,
    ) -> std::result::Result<u32, Duration> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if !windows.contains_key(key) {
            windows.retain(|_, window| window.resets_at > now);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            attempts: 0,
            resets_at: now + decay,
        });
        if window.resets_at <= now {
            window.attempts = 0;
            window.resets_at = now + decay;
        }
        if window.attempts >= max_attempts {
            return Err(window.resets_at.saturating_duration_since(now));
        }

        window.attempts += 1;
        Ok(window.attempts)
    }

    /// Number of open windows, expired ones included until the next prune.
    pub async fn len(&self) -> usize {
        self.windows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.windows.lock().await.is_empty()
    }
}

/// Throttles dispatches per user, guild and command.
///
/// Throttles sharing a store count separately unless they have the same limit and
/// decay.
pub struct RateLimit {
    store: Arc<RateLimitStore>,
    max_attempts: u32,
    decay: Duration,
}

impl RateLimit {
    pub fn new(store: Arc<RateLimitStore>, max_attempts: u32, decay: Duration) -> Self {
        Self {
            store,
            max_attempts,
            decay,
        }
    }

    /// `user|guild|command`, with `dm` for direct messages and the source kind when no
    /// command was resolved.
    pub fn signature(ctx: &DispatchContext) -> String {
        let guild = ctx
            .guild_id()
            .map(|guild_id| guild_id.to_string())
            .unwrap_or_else(|| "dm".to_string());
        let command = ctx
            .command
            .clone()
            .unwrap_or_else(|| ctx.source.kind_name().to_string());

        format!("{}|{guild}|{command}", ctx.user_id())
    }
}

#[async_trait]
impl Middleware for RateLimit {
    async fn handle(&self, ctx: &mut DispatchContext, next: Next<'_>) -> Result<()> {
        let signature = Self::signature(ctx);
        let key = format!(
            "{}|{}|{signature}",
            self.max_attempts,
            self.decay.as_secs()
        );

        if let Err(available_in) = self
            .store
            .attempt(&key, self.max_attempts, self.decay)
            .await
        {
            let seconds = available_in.as_secs().max(1);
            debug!(key = %key, seconds, "Dispatch throttled");

            return ctx
                .reply(
                    Reply::new(format!(
                        "You are doing that too often. Try again in {seconds} second(s)."
                    ))
                    .ephemeral(),
                )
                .await;
        }

        next.run(ctx).await
    }
}
