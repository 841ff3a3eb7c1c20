//! Lifecycle hooks.
//!
//! Callbacks receive the bot and run in registration order. Their outcome is not
//! consulted; a panicking callback is logged and the remaining callbacks still run.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, error};

use crate::bot::Bot;

/// Lifecycle stages, in the order they occur across one boot and stop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeBoot,
    AfterCommandsRegistered,
    AfterApplicationCommandsRegistered,
    AfterEventsRegistered,
    AfterServicesRegistered,
    AfterHttpServerStart,
    BeforeHttpServerStop,
    AfterInteractionsRegistered,
    AfterBoot,
    BeforeShutdown,
    BeforeRestart,
    AfterRestart,
}

impl Hook {
    pub const ALL: [Hook; 12] = [
        Hook::BeforeBoot,
        Hook::AfterCommandsRegistered,
        Hook::AfterApplicationCommandsRegistered,
        Hook::AfterEventsRegistered,
        Hook::AfterServicesRegistered,
        Hook::AfterHttpServerStart,
        Hook::BeforeHttpServerStop,
        Hook::AfterInteractionsRegistered,
        Hook::AfterBoot,
        Hook::BeforeShutdown,
        Hook::BeforeRestart,
        Hook::AfterRestart,
    ];
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

type HookCallback = Arc<dyn Fn(Arc<Bot>) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
pub struct HookRegistry {
    callbacks: RwLock<HashMap<Hook, Vec<HookCallback>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F, Fut>(&self, hook: Hook, callback: F)
    where
        F: Fn(Arc<Bot>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: HookCallback = Arc::new(move |bot| callback(bot).boxed());

        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(hook)
            .or_default()
            .push(callback);
    }

    pub fn count(&self, hook: Hook) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hook)
            .map_or(0, Vec::len)
    }

    /// Runs every callback registered for `hook`, one after another.
    pub async fn fire(&self, hook: Hook, bot: &Arc<Bot>) {
        let callbacks = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hook)
            .cloned()
            .unwrap_or_default();

        debug!(%hook, callbacks = callbacks.len(), "Firing lifecycle hook");

        for callback in callbacks {
            if AssertUnwindSafe(callback(bot.clone()))
                .catch_unwind()
                .await
                .is_err()
            {
                error!("A {} hook callback panicked", hook);
            }
        }
    }
}
