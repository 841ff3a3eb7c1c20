use super::*;
use crate::{
    command::{ApplicationCommand, CommandRegistry},
    error::Result,
    middleware::DispatchContext,
};
use serenity::async_trait;
use test_utils::fixture::attributes;

/// Tests the mixed create/delete scenario.
///
/// Local declares `ping` (global) and `ban` (guild G1). Remote holds an identical
/// `ping` and a `kick` in G1.
///
/// Expected: created={ban}, deleted={kick}, updated={}
#[tokio::test]
async fn creates_missing_and_deletes_stale_commands() {
    let gateway = FakeGateway::new()
        .with_guild(g1())
        .with_remote(CommandScope::Global, attributes::ping())
        .with_remote(CommandScope::Guild(g1()), attributes::kick());
    let reconciler = Reconciler::new(Arc::new(gateway));

    let remote = reconciler.fetch_remote().await.unwrap();
    let plan = plan(&local(vec![ping(), ban()]), &remote);

    assert_eq!(plan.created_names(), vec!["ban"]);
    assert_eq!(plan.deleted_names(), vec!["kick"]);
    assert!(plan.updated.is_empty());
}

/// Tests that key order and number representation never produce updates.
///
/// Expected: empty plan
#[test]
fn key_order_and_representation_are_ignored() {
    let local = local(vec![ping()]);
    let remote_attributes = match attributes::ping_reordered() {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    let remote_command = crate::gateway::RemoteCommand::from_attributes(
        CommandId::new(1),
        CommandScope::Global,
        &remote_attributes,
    )
    .unwrap();
    let remote = BTreeMap::from([("ping".to_string(), remote_command)]);

    assert!(plan(&local, &remote).is_empty());
}

/// Tests that a changed description produces an update naming that key.
///
/// Expected: updated={ping} with changed=["description"]
#[test]
fn changed_description_is_updated() {
    let local = local(vec![CommandDefinition::slash("ping", "Check round trip latency")]);
    let remote_attributes = match attributes::ping() {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    let remote_command = crate::gateway::RemoteCommand::from_attributes(
        CommandId::new(1),
        CommandScope::Global,
        &remote_attributes,
    )
    .unwrap();
    let remote = BTreeMap::from([("ping".to_string(), remote_command)]);

    let plan = plan(&local, &remote);

    assert_eq!(plan.updated_names(), vec!["ping"]);
    assert_eq!(plan.updated[0].changed, vec!["description"]);
    assert!(!plan.updated[0].scope_changed());
}

struct Toggle {
    enabled: bool,
}

#[async_trait]
impl ApplicationCommand for Toggle {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::slash("toggle", "Toggle a feature")
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn handle(&self, _ctx: &mut DispatchContext) -> Result<()> {
        Ok(())
    }
}

/// Tests that disabled commands never enter a plan.
///
/// A disabled local command that also exists remotely is deleted, never created or
/// updated.
///
/// Expected: local map empty; remote `toggle` only in deleted
#[tokio::test]
async fn disabled_commands_are_not_reconciled() {
    let mut registry = CommandRegistry::new();
    registry
        .register_slash(Arc::new(Toggle { enabled: false }))
        .unwrap();

    let local = Reconciler::local_commands(&registry).unwrap();
    assert!(local.is_empty());

    let gateway = FakeGateway::new().with_remote(
        CommandScope::Global,
        json!({"type": 1, "name": "toggle", "description": "Toggle a feature"}),
    );
    let reconciler = Reconciler::new(Arc::new(gateway));
    let plan = plan(&local, &reconciler.fetch_remote().await.unwrap());

    assert!(plan.created.is_empty());
    assert!(plan.updated.is_empty());
    assert_eq!(plan.deleted_names(), vec!["toggle"]);
}

/// Tests that fetches fan out to the global scope and every known guild.
///
/// Expected: one fetch per scope
#[tokio::test]
async fn fetches_every_scope() {
    let gateway = Arc::new(
        FakeGateway::new()
            .with_guild(g1())
            .with_guild(GuildId::new(200)),
    );
    let reconciler = Reconciler::new(gateway.clone());

    reconciler.fetch_remote().await.unwrap();

    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::Fetch(CommandScope::Global),
            GatewayCall::Fetch(CommandScope::Guild(g1())),
            GatewayCall::Fetch(CommandScope::Guild(GuildId::new(200))),
        ]
    );
}
