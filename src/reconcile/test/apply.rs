use super::*;
use crate::error::BotError;

/// Tests that a second pass without changes is a no-op.
///
/// Expected: first pass creates both commands; second pass plans and mutates nothing
#[tokio::test]
async fn second_pass_is_idempotent() {
    let gateway = Arc::new(FakeGateway::new().with_guild(g1()));
    let reconciler = Reconciler::new(gateway.clone());
    let local = local(vec![ping(), ban()]);

    let first = reconciler.reconcile(&local).await.unwrap();
    assert_eq!(first.created, vec!["ban", "ping"]);

    gateway.clear_calls();
    let remote = reconciler.fetch_remote().await.unwrap();
    assert!(plan(&local, &remote).is_empty());

    let second = reconciler.reconcile(&local).await.unwrap();
    assert!(second.created.is_empty() && second.updated.is_empty() && second.deleted.is_empty());
    assert!(gateway.mutations().is_empty());
}

/// Tests the global to guild scope change.
///
/// Verifies the old global registration is deleted by id before the command is created
/// in the guild, so it never exists in both scopes.
///
/// Expected: Delete(Global, id) then Upsert(Guild G1, "ping")
#[tokio::test]
async fn scope_change_deletes_old_scope_first() {
    let gateway = Arc::new(
        FakeGateway::new()
            .with_guild(g1())
            .with_remote(CommandScope::Global, test_utils::fixture::attributes::ping()),
    );
    let reconciler = Reconciler::new(gateway.clone());
    let remote_id = gateway.commands(CommandScope::Global)[0].id;

    let report = reconciler
        .reconcile(&local(vec![ping().guild(g1())]))
        .await
        .unwrap();

    assert_eq!(report.updated, vec!["ping"]);
    assert_eq!(
        gateway.mutations(),
        vec![
            GatewayCall::Delete(CommandScope::Global, remote_id),
            GatewayCall::Upsert(CommandScope::Guild(g1()), "ping".to_string()),
        ]
    );
    assert!(gateway.command_names(CommandScope::Global).is_empty());
    assert_eq!(gateway.command_names(CommandScope::Guild(g1())), vec!["ping"]);
}

/// Tests that a command scoped to an unknown guild is skipped, not fatal.
///
/// Expected: `ban` reported as failed, `ping` still created
#[tokio::test]
async fn unknown_guild_is_skipped() {
    let gateway = Arc::new(FakeGateway::new());
    let reconciler = Reconciler::new(gateway.clone());

    let report = reconciler
        .reconcile(&local(vec![ping(), ban()]))
        .await
        .unwrap();

    assert_eq!(report.created, vec!["ping"]);
    assert_eq!(report.failed, vec!["ban"]);
    assert_eq!(
        gateway.mutations(),
        vec![GatewayCall::Upsert(CommandScope::Global, "ping".to_string())]
    );
}

/// Tests that register and unregister report a missing guild.
///
/// Expected: Err(BotError::GuildNotFound)
#[tokio::test]
async fn register_remote_requires_known_guild() {
    let reconciler = Reconciler::new(Arc::new(FakeGateway::new()));
    let command = local(vec![ban()]).remove("ban").unwrap();

    let registered = reconciler.register_remote(&command).await;
    let unregistered = reconciler
        .unregister_remote(CommandId::new(5), Some(g1()))
        .await;

    assert!(matches!(registered, Err(BotError::GuildNotFound(id)) if id == g1()));
    assert!(matches!(unregistered, Err(BotError::GuildNotFound(id)) if id == g1()));
}

/// Tests that a failed fetch aborts the pass before any mutation.
///
/// Expected: Err, no mutations
#[tokio::test]
async fn failed_fetch_aborts_pass() {
    let gateway = Arc::new(FakeGateway::new().with_guild(g1()).failing_fetch());
    let reconciler = Reconciler::new(gateway.clone());

    let result = reconciler.reconcile(&local(vec![ping()])).await;

    assert!(result.is_err());
    assert!(gateway.mutations().is_empty());
}
