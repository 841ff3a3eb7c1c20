use std::time::Duration;

use axum::{routing::get, Router};

use super::*;
use crate::{
    bot::{DispatchOutcome, EventKind, EventListener, GatewayEvent},
    error::definition::DefinitionError,
    gateway::{fake::GatewayCall, CommandScope},
    router::{handler_fn, InteractionRoute},
    service::Service,
};

/// Tests the hooks fired by a boot without an HTTP server, followed by a stop.
///
/// Expected: Stage hooks in boot order, no HTTP hooks
#[tokio::test]
async fn fires_boot_hooks_in_order() {
    let bot = Arc::new(Bot::new(config()));
    let fired = record_hooks(&bot);

    boot(&bot).await;
    bot.stop().await;

    assert_eq!(
        *fired.lock().unwrap(),
        vec![
            Hook::BeforeBoot,
            Hook::AfterCommandsRegistered,
            Hook::AfterApplicationCommandsRegistered,
            Hook::AfterEventsRegistered,
            Hook::AfterServicesRegistered,
            Hook::AfterInteractionsRegistered,
            Hook::AfterBoot,
        ]
    );
}

/// Tests that the HTTP stage starts the server and stop closes it.
///
/// Expected: AfterHttpServerStart after the services stage, BeforeHttpServerStop on stop
#[tokio::test]
async fn http_hooks_fire_when_serving() {
    let mut config = config();
    config.http_address = Some("127.0.0.1:0".parse().unwrap());
    let bot = Arc::new(Bot::new(config));
    bot.serve_http(Router::new().route("/health", get(|| async { "ok" })));
    let fired = record_hooks(&bot);

    boot(&bot).await;
    bot.stop().await;

    let fired = fired.lock().unwrap().clone();
    assert_eq!(fired[4], Hook::AfterServicesRegistered);
    assert_eq!(fired[5], Hook::AfterHttpServerStart);
    assert_eq!(fired[6], Hook::AfterInteractionsRegistered);
    assert_eq!(fired.last(), Some(&Hook::BeforeHttpServerStop));
}

/// Tests that an address without routes does not start a server.
///
/// Expected: No HTTP hooks
#[tokio::test]
async fn http_address_without_routes_is_skipped() {
    let mut config = config();
    config.http_address = Some("127.0.0.1:0".parse().unwrap());
    let bot = Arc::new(Bot::new(config));
    let fired = record_hooks(&bot);

    boot(&bot).await;
    bot.stop().await;

    assert!(!fired.lock().unwrap().contains(&Hook::AfterHttpServerStart));
    assert!(!fired.lock().unwrap().contains(&Hook::BeforeHttpServerStop));
}

/// Tests that booting twice runs the sequence once.
///
/// Expected: One BeforeBoot, remote commands fetched once
#[tokio::test]
async fn boot_is_idempotent() {
    let bot = Arc::new(Bot::new(config()));
    let fired = record_hooks(&bot);
    let gateway = Arc::new(FakeGateway::new());
    bot.set_responder(Arc::new(RecordingResponder::new()));

    bot.boot(gateway.clone()).await.unwrap();
    bot.boot(gateway.clone()).await.unwrap();

    let before_boot = fired
        .lock()
        .unwrap()
        .iter()
        .filter(|hook| **hook == Hook::BeforeBoot)
        .count();
    assert_eq!(before_boot, 1);
    assert_eq!(gateway.calls(), vec![GatewayCall::Fetch(CommandScope::Global)]);
    assert!(bot.is_booted());
}

/// Tests that boot registers application commands remotely and wires their routes.
///
/// Expected: `ping` upserted globally and routable afterwards
#[tokio::test]
async fn boot_reconciles_and_wires_application_commands() {
    let bot = Arc::new(Bot::new(config()));
    let calls = ping(&bot, false, false);
    let gateway = Arc::new(FakeGateway::new());
    let responder = Arc::new(RecordingResponder::new());
    bot.set_responder(responder.clone());

    bot.boot(gateway.clone()).await.unwrap();

    assert_eq!(
        gateway.mutations(),
        vec![GatewayCall::Upsert(CommandScope::Global, "ping".to_string())]
    );
    let outcome = bot.handle_interaction(interaction(MEMBER, slash("ping"))).await;
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(responder.replies(), vec![Reply::new("Pong!")]);
}

/// Tests that a failed remote fetch aborts boot.
///
/// Expected: Err, not booted, interactions still ignored, later boot can succeed
#[tokio::test]
async fn failed_fetch_aborts_boot() {
    let bot = Arc::new(Bot::new(config()));
    ping(&bot, false, false);
    let fired = record_hooks(&bot);
    bot.set_responder(Arc::new(RecordingResponder::new()));

    let result = bot.boot(Arc::new(FakeGateway::new().failing_fetch())).await;

    assert!(result.is_err());
    assert!(!bot.is_booted());
    assert!(!fired.lock().unwrap().contains(&Hook::AfterBoot));
    let outcome = bot.handle_interaction(interaction(MEMBER, slash("ping"))).await;
    assert_eq!(outcome, DispatchOutcome::Ignored);

    bot.boot(Arc::new(FakeGateway::new())).await.unwrap();
    assert!(bot.is_booted());
}

/// Tests the restart hooks around a second boot.
///
/// Expected: AfterRestart fired right after AfterBoot of the second boot only
#[tokio::test]
async fn restart_fires_after_restart_once() {
    let bot = Arc::new(Bot::new(config()));
    let fired = record_hooks(&bot);

    boot(&bot).await;
    bot.stop().await;
    bot.flags.restarting.store(true, std::sync::atomic::Ordering::SeqCst);
    boot(&bot).await;

    let fired = fired.lock().unwrap().clone();
    assert_eq!(fired.iter().filter(|h| **h == Hook::AfterBoot).count(), 2);
    assert_eq!(fired.last(), Some(&Hook::AfterRestart));
    assert_eq!(fired.iter().filter(|h| **h == Hook::AfterRestart).count(), 1);
}

/// Tests that routes of an application command registered after boot are wired.
///
/// Expected: The late command is routable without another boot
#[tokio::test]
async fn late_registration_is_routed() {
    let bot = Arc::new(Bot::new(config()));
    boot(&bot).await;

    let calls = ping(&bot, false, false);
    let outcome = bot.handle_interaction(interaction(MEMBER, slash("ping"))).await;

    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

struct Silent;

#[async_trait]
impl EventListener for Silent {
    fn name(&self) -> &str {
        "silent"
    }

    fn events(&self) -> Vec<EventKind> {
        Vec::new()
    }

    async fn handle(&self, _bot: Arc<Bot>, _event: &GatewayEvent) -> Result<()> {
        Ok(())
    }
}

struct Stalled;

#[async_trait]
impl Service for Stalled {
    fn name(&self) -> &str {
        "stalled"
    }

    fn interval(&self) -> Duration {
        Duration::ZERO
    }

    async fn handle(&self, _bot: Arc<Bot>) -> Result<()> {
        Ok(())
    }
}

/// Tests that values not satisfying their capability are rejected at registration.
///
/// Expected: InvalidDefinition for the listener and the service, InvalidMiddleware for
/// the route
#[test]
fn rejects_invalid_registrations() {
    let bot = Bot::new(config());

    assert!(matches!(
        bot.add_event_listener(Arc::new(Silent)),
        Err(BotError::DefinitionErr(DefinitionError::InvalidDefinition { .. }))
    ));
    assert!(matches!(
        bot.add_service(Arc::new(Stalled)),
        Err(BotError::DefinitionErr(DefinitionError::InvalidDefinition { .. }))
    ));

    let route = InteractionRoute::new("confirm", handler_fn(|_| async { Ok(()) }))
        .middleware("auth");
    assert!(matches!(
        bot.add_route(route),
        Err(BotError::DefinitionErr(DefinitionError::InvalidMiddleware { .. }))
    ));
    assert!(matches!(
        bot.use_middleware("throttle:often"),
        Err(BotError::DefinitionErr(DefinitionError::InvalidMiddleware { .. }))
    ));
}
