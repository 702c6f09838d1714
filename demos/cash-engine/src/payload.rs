// demos/cash-engine/src/payload.rs
// ============================================================================
// Module: Cash Engine Payload Builders
// Description: Pure command-type → event-payload functions (§4.3 "Payload
//              builder").
// Purpose: Translate an inbound command's business fields into the event
//          payload this engine persists, merged with the mechanical fields
//          every engine includes.
// Dependencies: bos-core, bos-events, serde_json
// ============================================================================

use bos_core::core::command::Command;
use bos_core::core::command::Payload;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;
use serde_json::Value;

const POLICY_NAME: &str = "cash_engine";

/// Reads a required string field from `payload`.
fn require_str(payload: &Payload, field: &str) -> Result<String, RejectionReason> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed(field))
}

/// Reads a required integer (minor-unit currency) field from `payload`.
fn require_i64(payload: &Payload, field: &str) -> Result<i64, RejectionReason> {
    payload.get(field).and_then(Value::as_i64).ok_or_else(|| malformed(field))
}

/// Builds a `MALFORMED_PAYLOAD` rejection naming the offending field.
fn malformed(field: &str) -> RejectionReason {
    RejectionReason::new(
        ReasonCode::Engine("MALFORMED_PAYLOAD".to_string()),
        format!("command payload is missing or has the wrong type for `{field}`"),
        POLICY_NAME,
    )
}

/// Builds the payload for [`crate::commands::SESSION_OPENED_EVENT`].
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `session_id`, `drawer_id`, or
/// `opening_balance` is absent or the wrong type.
pub fn build_open_session_payload(command: &Command) -> Result<Payload, RejectionReason> {
    let input = command.payload();
    let session_id = require_str(input, "session_id")?;
    let drawer_id = require_str(input, "drawer_id")?;
    let opening_balance = require_i64(input, "opening_balance")?;

    let mut fields = bos_events::mechanical_fields(command);
    fields.insert("session_id".to_string(), Value::String(session_id));
    fields.insert("drawer_id".to_string(), Value::String(drawer_id));
    fields.insert("opening_balance".to_string(), Value::from(opening_balance));
    Ok(fields)
}

/// Builds the payload for [`crate::commands::PAYMENT_RECORDED_EVENT`].
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `session_id`, `amount`, or
/// `method` is absent or the wrong type.
pub fn build_payment_payload(command: &Command) -> Result<Payload, RejectionReason> {
    let input = command.payload();
    let session_id = require_str(input, "session_id")?;
    let amount = require_i64(input, "amount")?;
    let method = require_str(input, "method")?;

    let mut fields = bos_events::mechanical_fields(command);
    fields.insert("session_id".to_string(), Value::String(session_id));
    fields.insert("amount".to_string(), Value::from(amount));
    fields.insert("method".to_string(), Value::String(method));
    Ok(fields)
}

/// Builds the payload for [`crate::commands::SESSION_CLOSED_EVENT`].
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `session_id`,
/// `closing_balance`, or `expected_balance` is absent or the wrong type.
pub fn build_close_session_payload(command: &Command) -> Result<Payload, RejectionReason> {
    let input = command.payload();
    let session_id = require_str(input, "session_id")?;
    let closing_balance = require_i64(input, "closing_balance")?;
    let expected_balance = require_i64(input, "expected_balance")?;

    let mut fields = bos_events::mechanical_fields(command);
    fields.insert("session_id".to_string(), Value::String(session_id));
    fields.insert("closing_balance".to_string(), Value::from(closing_balance));
    fields.insert("expected_balance".to_string(), Value::from(expected_balance));
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
            actor_id: ActorId::new("teller-1").expect("valid"),
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
    fn open_session_payload_carries_business_and_mechanical_fields() {
        let mut payload = Map::new();
        payload.insert("session_id".to_string(), json!("S1"));
        payload.insert("drawer_id".to_string(), json!("D1"));
        payload.insert("opening_balance".to_string(), json!(50000));
        let command = command_with_payload(crate::commands::OPEN_SESSION_INTENT, payload);

        let built = build_open_session_payload(&command).expect("built");
        assert_eq!(built.get("session_id"), Some(&json!("S1")));
        assert_eq!(built.get("opening_balance"), Some(&json!(50000)));
        assert!(built.contains_key("tenant_id"));
    }

    #[test]
    fn open_session_payload_rejects_missing_field() {
        let command = command_with_payload(crate::commands::OPEN_SESSION_INTENT, Map::new());
        let err = build_open_session_payload(&command).expect_err("rejected");
        assert_eq!(err.code(), &ReasonCode::Engine("MALFORMED_PAYLOAD".to_string()));
    }
}
