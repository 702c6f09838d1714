// demos/inventory-engine/src/handler.rs
// ============================================================================
// Module: Inventory Engine Handler
// Description: The `CommandHandler` this engine registers with the
//              dispatcher for its two owned intents.
// Purpose: Implement §4.3 "Engine handler": internal scope guard, internal
//          feature-flag check, the `INSUFFICIENT_STOCK` business rule,
//          payload build, event factory, persist, and projection apply.
// Dependencies: bos-core, bos-dispatcher, bos-events, bos-projection,
//               serde_json
// ============================================================================

use std::sync::Arc;

use bos_core::core::command::Command;
use bos_core::core::command::ScopeRequirement;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;
use bos_core::core::time::Clock;
use bos_core::interfaces::providers::FeatureFlagProvider;
use bos_core::interfaces::providers::FlagStatus;
use bos_core::NullBusinessContext;
use bos_dispatcher::guards;
use bos_dispatcher::CommandHandler;
use bos_dispatcher::ExecutionResult;
use bos_events::EventTypeRegistry;
use bos_events::PersistenceSink;
use serde_json::Value;

use crate::commands;
use crate::payload;
use crate::projection::InventoryProjection;

/// This engine's own master feature flag.
pub const ENABLE_INVENTORY_ENGINE_FLAG_KEY: &str = "ENABLE_INVENTORY_ENGINE";

const POLICY_NAME: &str = "inventory_engine";

/// The inventory engine's `CommandHandler`: receives and issues stock
/// against its own [`InventoryProjection`].
pub struct InventoryEngine {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn PersistenceSink>,
    event_registry: Arc<EventTypeRegistry>,
    projection: Arc<InventoryProjection>,
    feature_flag_provider: Option<Arc<dyn FeatureFlagProvider>>,
}

impl InventoryEngine {
    /// Builds a handler backed by `clock`, `sink`, and `event_registry`, with
    /// a fresh [`InventoryProjection`].
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        sink: Arc<dyn PersistenceSink>,
        event_registry: Arc<EventTypeRegistry>,
        feature_flag_provider: Option<Arc<dyn FeatureFlagProvider>>,
    ) -> Self {
        event_registry.register_all(commands::owned_event_types());
        Self { clock, sink, event_registry, projection: Arc::new(InventoryProjection::new()), feature_flag_provider }
    }

    /// Returns the projection this handler folds accepted events into.
    #[must_use]
    pub fn projection(&self) -> &Arc<InventoryProjection> {
        &self.projection
    }

    fn internal_scope_guard(command: &Command) -> Result<(), RejectionReason> {
        if command.scope_requirement() == ScopeRequirement::BranchRequired && command.branch_id().is_none() {
            return Err(RejectionReason::new(ReasonCode::BranchRequiredMissing, "a branch id is required for this command", POLICY_NAME));
        }
        Ok(())
    }

    fn internal_feature_flag_guard(&self, command: &Command) -> Result<(), RejectionReason> {
        let Some(provider) = self.feature_flag_provider.as_ref() else { return Ok(()) };
        let Ok(records) = provider.flags_for_tenant(command.tenant_id()) else { return Ok(()) };
        match guards::resolve_flag(&records, ENABLE_INVENTORY_ENGINE_FLAG_KEY, command.branch_id()) {
            Some(FlagStatus::Disabled) => Err(RejectionReason::new(
                ReasonCode::FeatureDisabled,
                format!("feature `{ENABLE_INVENTORY_ENGINE_FLAG_KEY}` is disabled"),
                POLICY_NAME,
            )),
            Some(FlagStatus::Enabled) | None => Ok(()),
        }
    }

    /// Rejects with `INSUFFICIENT_STOCK` when fewer units than requested
    /// remain at `(item, location)`. Checked before the issue event is built
    /// so an underfunded issue never reaches the sink (§3 "Consumption
    /// returns" still applies at the ledger level for callers that consume
    /// directly; the handler enforces the stricter all-or-nothing business
    /// rule for `inventory.stock.issue.request`).
    fn require_sufficient_stock(&self, item: &str, location: &str, qty: i64) -> Result<(), RejectionReason> {
        let available = self.projection.stock_on_hand(item, location);
        if available < qty {
            return Err(RejectionReason::new(
                ReasonCode::Engine("INSUFFICIENT_STOCK".to_string()),
                format!("requested {qty} units but only {available} remain at `{item}`/`{location}`"),
                POLICY_NAME,
            ));
        }
        Ok(())
    }

    fn accept(&self, command: &Command, event_type: &str, built_payload: bos_core::core::command::Payload) -> ExecutionResult {
        let event = bos_events::build_event(command, event_type, built_payload, self.clock.as_ref());
        let persisted = self.sink.persist(&event, &NullBusinessContext, &self.event_registry, command.scope_requirement());
        let projection_applied = if persisted.accepted {
            self.projection.apply(event.event_type(), event.payload());
            true
        } else {
            false
        };
        ExecutionResult { event_type: event_type.to_string(), event, persisted, projection_applied, detail: None }
    }
}

impl CommandHandler for InventoryEngine {
    fn handle(&self, command: &Command) -> Result<ExecutionResult, RejectionReason> {
        Self::internal_scope_guard(command)?;
        self.internal_feature_flag_guard(command)?;

        match command.intent() {
            intent if intent == commands::RECEIVE_STOCK_INTENT => {
                let built = payload::build_receive_payload(command)?;
                Ok(self.accept(command, commands::STOCK_RECEIVED_EVENT, built))
            }
            intent if intent == commands::ISSUE_STOCK_INTENT => {
                let built = payload::build_issue_payload(command)?;
                let item = built.get("item").and_then(Value::as_str).unwrap_or_default();
                let location = built.get("location").and_then(Value::as_str).unwrap_or_default();
                let qty = built.get("qty").and_then(Value::as_i64).unwrap_or_default();
                self.require_sufficient_stock(item, location, qty)?;
                Ok(self.accept(command, commands::STOCK_ISSUED_EVENT, built))
            }
            other => Err(RejectionReason::new(
                ReasonCode::InvalidCommandType,
                format!("inventory engine does not own intent `{other}`"),
                POLICY_NAME,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use bos_core::core::command::ActorKind;
    use bos_core::core::command::ActorRequirement;
    use bos_core::core::command::CommandKind;
    use bos_core::core::command::CommandSpec;
    use bos_core::core::identifiers::ActorId;
    use bos_core::core::identifiers::BranchId;
    use bos_core::core::identifiers::CorrelationId;
    use bos_core::core::identifiers::TenantId;
    use bos_core::core::time::FixedClock;
    use bos_events::InMemoryEventSink;
    use serde_json::Map;
    use serde_json::json;
    use time::OffsetDateTime;

    use super::*;

    fn engine() -> InventoryEngine {
        InventoryEngine::new(Arc::new(FixedClock::new(OffsetDateTime::now_utc())), Arc::new(InMemoryEventSink::new()), Arc::new(EventTypeRegistry::new()), None)
    }

    fn command(intent: &str, tenant_id: TenantId, branch_id: BranchId, payload: bos_core::core::command::Payload) -> Command {
        Command::new(CommandSpec {
            intent: intent.to_string(),
            tenant_id,
            branch_id: Some(branch_id),
            actor_kind: ActorKind::Human,
            actor_id: ActorId::new("warehouse-1").expect("valid"),
            payload,
            issued_at: OffsetDateTime::now_utc(),
            correlation_id: CorrelationId::new(),
            scope_requirement: ScopeRequirement::BranchRequired,
            actor_requirement: ActorRequirement::ActorRequired,
            kind: CommandKind::Write,
        })
        .expect("valid command")
    }

    #[test]
    fn fifo_receive_then_issue_matches_scenario_s2() {
        let engine = engine();
        let tenant_id = TenantId::new();
        let branch_id = BranchId::new();

        let mut receive_one = Map::new();
        receive_one.insert("item".to_string(), json!("itemA"));
        receive_one.insert("location".to_string(), json!("locA"));
        receive_one.insert("qty".to_string(), json!(20));
        receive_one.insert("unit_cost".to_string(), json!(1000));
        engine.handle(&command(commands::RECEIVE_STOCK_INTENT, tenant_id, branch_id, receive_one)).expect("accepted");

        let mut receive_two = Map::new();
        receive_two.insert("item".to_string(), json!("itemA"));
        receive_two.insert("location".to_string(), json!("locA"));
        receive_two.insert("qty".to_string(), json!(30));
        receive_two.insert("unit_cost".to_string(), json!(1500));
        engine.handle(&command(commands::RECEIVE_STOCK_INTENT, tenant_id, branch_id, receive_two)).expect("accepted");

        let mut issue = Map::new();
        issue.insert("item".to_string(), json!("itemA"));
        issue.insert("location".to_string(), json!("locA"));
        issue.insert("qty".to_string(), json!(35));
        let result = engine.handle(&command(commands::ISSUE_STOCK_INTENT, tenant_id, branch_id, issue)).expect("accepted");
        assert!(result.projection_applied);

        assert_eq!(engine.projection().stock_on_hand("itemA", "locA"), 15);
        assert_eq!(engine.projection().stock_value("itemA", "locA"), 15 * 1500);
    }

    #[test]
    fn issue_beyond_available_stock_is_rejected_with_insufficient_stock() {
        let engine = engine();
        let tenant_id = TenantId::new();
        let branch_id = BranchId::new();

        let mut receive = Map::new();
        receive.insert("item".to_string(), json!("itemA"));
        receive.insert("location".to_string(), json!("locA"));
        receive.insert("qty".to_string(), json!(5));
        receive.insert("unit_cost".to_string(), json!(100));
        engine.handle(&command(commands::RECEIVE_STOCK_INTENT, tenant_id, branch_id, receive)).expect("accepted");

        let mut issue = Map::new();
        issue.insert("item".to_string(), json!("itemA"));
        issue.insert("location".to_string(), json!("locA"));
        issue.insert("qty".to_string(), json!(10));
        let err = engine.handle(&command(commands::ISSUE_STOCK_INTENT, tenant_id, branch_id, issue)).expect_err("rejected");
        assert_eq!(err.code(), &ReasonCode::Engine("INSUFFICIENT_STOCK".to_string()));
        assert_eq!(engine.projection().stock_on_hand("itemA", "locA"), 5);
    }

    #[test]
    fn unowned_intent_is_rejected() {
        let engine = engine();
        let err = engine
            .handle(&command("cash.session.open.request", TenantId::new(), BranchId::new(), Map::new()))
            .expect_err("rejected");
        assert_eq!(err.code(), &ReasonCode::InvalidCommandType);
    }
}
