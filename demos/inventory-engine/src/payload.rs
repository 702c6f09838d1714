// demos/inventory-engine/src/payload.rs
// ============================================================================
// Module: Inventory Engine Payload Builders
// Description: Pure command-type → event-payload functions (§4.3 "Payload
//              builder").
// Purpose: Translate an inbound command's business fields into the event
//          payload this engine persists, merged with the mechanical fields
//          every engine includes.
// Dependencies: bos-core, bos-events, serde_json, uuid
// ============================================================================

use bos_core::core::command::Command;
use bos_core::core::command::Payload;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;
use serde_json::Value;

const POLICY_NAME: &str = "inventory_engine";

/// Reads a required string field from `payload`.
fn require_str(payload: &Payload, field: &str) -> Result<String, RejectionReason> {
    payload.get(field).and_then(Value::as_str).map(str::to_string).ok_or_else(|| malformed(field))
}

/// Reads a required integer field from `payload`.
fn require_i64(payload: &Payload, field: &str) -> Result<i64, RejectionReason> {
    payload.get(field).and_then(Value::as_i64).ok_or_else(|| malformed(field))
}

/// Reads an optional string field, defaulting to `default` when absent.
fn optional_str(payload: &Payload, field: &str, default: &str) -> String {
    payload.get(field).and_then(Value::as_str).unwrap_or(default).to_string()
}

/// Builds a `MALFORMED_PAYLOAD` rejection naming the offending field.
fn malformed(field: &str) -> RejectionReason {
    RejectionReason::new(
        ReasonCode::Engine("MALFORMED_PAYLOAD".to_string()),
        format!("command payload is missing or has the wrong type for `{field}`"),
        POLICY_NAME,
    )
}

/// Builds the payload for [`crate::commands::STOCK_RECEIVED_EVENT`].
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `item`, `location`, `qty`, or
/// `unit_cost` is absent or the wrong type.
pub fn build_receive_payload(command: &Command) -> Result<Payload, RejectionReason> {
    let input = command.payload();
    let item = require_str(input, "item")?;
    let location = require_str(input, "location")?;
    let qty = require_i64(input, "qty")?;
    let unit_cost = require_i64(input, "unit_cost")?;
    let reference = optional_str(input, "reference", "");
    let lot_id = optional_str(input, "lot_id", &uuid::Uuid::new_v4().to_string());

    let mut fields = bos_events::mechanical_fields(command);
    fields.insert("item".to_string(), Value::String(item));
    fields.insert("location".to_string(), Value::String(location));
    fields.insert("lot_id".to_string(), Value::String(lot_id));
    fields.insert("qty".to_string(), Value::from(qty));
    fields.insert("unit_cost".to_string(), Value::from(unit_cost));
    fields.insert("reference".to_string(), Value::String(reference));
    Ok(fields)
}

/// Builds the payload for [`crate::commands::STOCK_ISSUED_EVENT`].
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `item`, `location`, or `qty`
/// is absent or the wrong type.
pub fn build_issue_payload(command: &Command) -> Result<Payload, RejectionReason> {
    let input = command.payload();
    let item = require_str(input, "item")?;
    let location = require_str(input, "location")?;
    let qty = require_i64(input, "qty")?;
    let method = optional_str(input, "method", "FIFO");

    let mut fields = bos_events::mechanical_fields(command);
    fields.insert("item".to_string(), Value::String(item));
    fields.insert("location".to_string(), Value::String(location));
    fields.insert("qty".to_string(), Value::from(qty));
    fields.insert("method".to_string(), Value::String(method));
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use bos_core::core::command::ActorKind;
    use bos_core::core::command::ActorRequirement;
    use bos_core::core::command::CommandKind;
    use bos_core::core::command::CommandSpec;
    use bos_core::core::command::ScopeRequirement;
    use bos_core::core::identifiers::ActorId;
    use bos_core::core::identifiers::BranchId;
    use bos_core::core::identifiers::CorrelationId;
    use bos_core::core::identifiers::TenantId;
    use serde_json::Map;
    use serde_json::json;
    use time::OffsetDateTime;

    use super::*;

    fn command_with_payload(intent: &str, payload: Payload) -> Command {
        Command::new(CommandSpec {
            intent: intent.to_string(),
            tenant_id: TenantId::new(),
            branch_id: Some(BranchId::new()),
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
    fn receive_payload_carries_business_and_mechanical_fields() {
        let mut payload = Map::new();
        payload.insert("item".to_string(), json!("itemA"));
        payload.insert("location".to_string(), json!("locA"));
        payload.insert("qty".to_string(), json!(20));
        payload.insert("unit_cost".to_string(), json!(1000));
        let command = command_with_payload(crate::commands::RECEIVE_STOCK_INTENT, payload);

        let built = build_receive_payload(&command).expect("built");
        assert_eq!(built.get("item"), Some(&json!("itemA")));
        assert!(built.contains_key("lot_id"));
        assert!(built.contains_key("tenant_id"));
    }

    #[test]
    fn receive_payload_rejects_missing_field() {
        let command = command_with_payload(crate::commands::RECEIVE_STOCK_INTENT, Map::new());
        let err = build_receive_payload(&command).expect_err("rejected");
        assert_eq!(err.code(), &ReasonCode::Engine("MALFORMED_PAYLOAD".to_string()));
    }

    #[test]
    fn issue_payload_defaults_method_to_fifo() {
        let mut payload = Map::new();
        payload.insert("item".to_string(), json!("itemA"));
        payload.insert("location".to_string(), json!("locA"));
        payload.insert("qty".to_string(), json!(5));
        let command = command_with_payload(crate::commands::ISSUE_STOCK_INTENT, payload);

        let built = build_issue_payload(&command).expect("built");
        assert_eq!(built.get("method"), Some(&json!("FIFO")));
    }
}
