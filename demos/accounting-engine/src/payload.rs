// demos/accounting-engine/src/payload.rs
// ============================================================================
// Module: Accounting Engine Payload Builders
// Description: Pure command-type → event-payload functions (§4.3 "Payload
//              builder"), plus journal-line parsing shared with the handler's
//              balance check.
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
use serde_json::json;

const POLICY_NAME: &str = "accounting_engine";

/// One parsed line of a journal entry: exactly one of `debit`/`credit` is
/// normally non-zero, but both are carried so a caller may express a net
/// line either way.
#[derive(Debug, Clone)]
pub struct JournalLine {
    /// The account code this line posts against.
    pub account: String,
    /// Debit amount, in minor currency units.
    pub debit: i64,
    /// Credit amount, in minor currency units.
    pub credit: i64,
}

/// Reads a required string field from `payload`.
fn require_str(payload: &Payload, field: &str) -> Result<String, RejectionReason> {
    payload.get(field).and_then(Value::as_str).map(str::to_string).ok_or_else(|| malformed(field))
}

/// Reads a required integer field from `payload`.
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

/// Parses the `lines` array of a `accounting.journal.post.request` command's
/// payload into [`JournalLine`] values.
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `lines` is absent, not an
/// array, empty, or any element is missing `account`/`debit`/`credit`.
pub fn parse_journal_lines(payload: &Payload) -> Result<Vec<JournalLine>, RejectionReason> {
    let raw_lines = payload.get("lines").and_then(Value::as_array).ok_or_else(|| malformed("lines"))?;
    if raw_lines.is_empty() {
        return Err(malformed("lines"));
    }
    raw_lines
        .iter()
        .map(|raw| {
            let object = raw.as_object().ok_or_else(|| malformed("lines[].account"))?;
            let account = object.get("account").and_then(Value::as_str).map(str::to_string).ok_or_else(|| malformed("lines[].account"))?;
            let debit = object.get("debit").and_then(Value::as_i64).ok_or_else(|| malformed("lines[].debit"))?;
            let credit = object.get("credit").and_then(Value::as_i64).ok_or_else(|| malformed("lines[].credit"))?;
            Ok(JournalLine { account, debit, credit })
        })
        .collect()
}

/// Builds the payload for [`crate::commands::JOURNAL_POSTED_EVENT`] from
/// already-parsed, already-balance-checked `lines`.
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `entry_id` is absent.
pub fn build_journal_payload(command: &Command, lines: &[JournalLine]) -> Result<Payload, RejectionReason> {
    let entry_id = require_str(command.payload(), "entry_id")?;
    let total_debit: i64 = lines.iter().map(|line| line.debit).sum();
    let total_credit: i64 = lines.iter().map(|line| line.credit).sum();

    let mut fields = bos_events::mechanical_fields(command);
    fields.insert("entry_id".to_string(), Value::String(entry_id));
    fields.insert(
        "lines".to_string(),
        Value::Array(lines.iter().map(|line| json!({"account": line.account, "debit": line.debit, "credit": line.credit})).collect()),
    );
    fields.insert("total_debit".to_string(), Value::from(total_debit));
    fields.insert("total_credit".to_string(), Value::from(total_credit));
    Ok(fields)
}

/// Builds the payload for [`crate::commands::OBLIGATION_RECORDED_EVENT`].
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `obligation_id` or `amount`
/// is absent or the wrong type.
pub fn build_record_obligation_payload(command: &Command) -> Result<Payload, RejectionReason> {
    let input = command.payload();
    let obligation_id = require_str(input, "obligation_id")?;
    let amount = require_i64(input, "amount")?;

    let mut fields = bos_events::mechanical_fields(command);
    fields.insert("obligation_id".to_string(), Value::String(obligation_id));
    fields.insert("amount".to_string(), Value::from(amount));
    Ok(fields)
}

/// Builds the payload for [`crate::commands::OBLIGATION_FULFILLED_EVENT`].
///
/// # Errors
///
/// Returns a `MALFORMED_PAYLOAD` rejection when `obligation_id` or `amount`
/// is absent or the wrong type.
pub fn build_fulfill_obligation_payload(command: &Command) -> Result<Payload, RejectionReason> {
    let input = command.payload();
    let obligation_id = require_str(input, "obligation_id")?;
    let amount = require_i64(input, "amount")?;

    let mut fields = bos_events::mechanical_fields(command);
    fields.insert("obligation_id".to_string(), Value::String(obligation_id));
    fields.insert("amount".to_string(), Value::from(amount));
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
    use bos_core::core::identifiers::CorrelationId;
    use bos_core::core::identifiers::TenantId;
    use serde_json::Map;
    use time::OffsetDateTime;

    use super::*;

    fn command_with_payload(intent: &str, payload: Payload) -> Command {
        Command::new(CommandSpec {
            intent: intent.to_string(),
            tenant_id: TenantId::new(),
            branch_id: None,
            actor_kind: ActorKind::Human,
            actor_id: ActorId::new("bookkeeper-1").expect("valid"),
            payload,
            issued_at: OffsetDateTime::now_utc(),
            correlation_id: CorrelationId::new(),
            scope_requirement: ScopeRequirement::BusinessAllowed,
            actor_requirement: ActorRequirement::ActorRequired,
            kind: CommandKind::Write,
        })
        .expect("valid command")
    }

    #[test]
    fn unbalanced_lines_are_detectable_from_parsed_totals() {
        let mut payload = Map::new();
        payload.insert("entry_id".to_string(), json!("E1"));
        payload.insert("lines".to_string(), json!([{"account": "A", "debit": 1000, "credit": 0}, {"account": "B", "debit": 0, "credit": 800}]));
        let command = command_with_payload(crate::commands::POST_JOURNAL_ENTRY_INTENT, payload);

        let lines = parse_journal_lines(command.payload()).expect("parsed");
        let total_debit: i64 = lines.iter().map(|line| line.debit).sum();
        let total_credit: i64 = lines.iter().map(|line| line.credit).sum();
        assert_ne!(total_debit, total_credit);
    }

    #[test]
    fn parse_journal_lines_rejects_missing_lines_field() {
        let command = command_with_payload(crate::commands::POST_JOURNAL_ENTRY_INTENT, Map::new());
        let err = parse_journal_lines(command.payload()).expect_err("rejected");
        assert_eq!(err.code(), &ReasonCode::Engine("MALFORMED_PAYLOAD".to_string()));
    }

    #[test]
    fn build_journal_payload_carries_entry_id_and_totals() {
        let mut payload = Map::new();
        payload.insert("entry_id".to_string(), json!("E1"));
        payload.insert("lines".to_string(), json!([{"account": "A", "debit": 1000, "credit": 0}, {"account": "B", "debit": 0, "credit": 1000}]));
        let command = command_with_payload(crate::commands::POST_JOURNAL_ENTRY_INTENT, payload);
        let lines = parse_journal_lines(command.payload()).expect("parsed");

        let built = build_journal_payload(&command, &lines).expect("built");
        assert_eq!(built.get("total_debit"), Some(&json!(1000)));
        assert_eq!(built.get("total_credit"), Some(&json!(1000)));
    }
}
