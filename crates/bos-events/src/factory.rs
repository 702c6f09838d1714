// crates/bos-events/src/factory.rs
// ============================================================================
// Module: BOS Event Factory
// Description: Builds an `EventEnvelope` from a command, event type, and payload.
// Purpose: Implement §4.3 "Event factory" — mechanical construction, never
//          business-content-aware.
// Dependencies: bos-core, time
// ============================================================================

use bos_core::core::command::Command;
use bos_core::core::command::Payload;
use bos_core::core::event::EventEnvelope;
use bos_core::core::event::EventEnvelopeSpec;
use bos_core::core::time::Clock;
use serde_json::Value;

/// Returns the mechanical fields every engine's payload builder includes
/// alongside its own business fields (§4.3 "Payload builder"): tenant id,
/// branch id (nullable), actor id and kind, correlation id, command id, and
/// issued-at.
///
/// Engine-specific fields are merged into the returned map by the caller;
/// this function never reads `command.payload()`'s business content.
#[must_use]
pub fn mechanical_fields(command: &Command) -> Payload {
    let mut fields = Payload::new();
    fields.insert("tenant_id".to_string(), Value::String(command.tenant_id().to_string()));
    fields.insert(
        "branch_id".to_string(),
        command.branch_id().map_or(Value::Null, |branch_id| Value::String(branch_id.to_string())),
    );
    fields.insert("actor_id".to_string(), Value::String(command.actor_id().as_str().to_string()));
    fields.insert("actor_kind".to_string(), Value::String(actor_kind_label(command.actor_kind()).to_string()));
    fields.insert("correlation_id".to_string(), Value::String(command.correlation_id().to_string()));
    fields.insert("command_id".to_string(), Value::String(command.id().to_string()));
    fields.insert(
        "issued_at".to_string(),
        Value::String(command.issued_at().format(&time::format_description::well_known::Rfc3339).unwrap_or_default()),
    );
    fields
}

/// Renders an actor kind the way it appears in event payloads.
fn actor_kind_label(kind: bos_core::core::command::ActorKind) -> &'static str {
    match kind {
        bos_core::core::command::ActorKind::Human => "HUMAN",
        bos_core::core::command::ActorKind::System => "SYSTEM",
        bos_core::core::command::ActorKind::Device => "DEVICE",
        bos_core::core::command::ActorKind::Ai => "AI",
    }
}

/// Builds the event envelope for an accepted command.
///
/// Never inspects `payload`'s business content — it only reads the fields a
/// mechanical envelope requires.
#[must_use]
pub fn build_event(command: &Command, event_type: impl Into<String>, payload: Payload, clock: &dyn Clock) -> EventEnvelope {
    EventEnvelope::new(EventEnvelopeSpec {
        event_type: event_type.into(),
        payload,
        tenant_id: command.tenant_id(),
        branch_id: command.branch_id(),
        correlation_id: command.correlation_id(),
        command_id: command.id(),
        actor_id: command.actor_id().as_str().to_string(),
        actor_kind: command.actor_kind(),
        occurred_at: clock.now(),
    })
}

/// Derives the mechanical "rejected" event type for `intent`: strip the
/// trailing `.request` and append `.rejected` (§4.3 "Event naming law").
#[must_use]
pub fn rejected_event_type(intent: &str) -> String {
    format!("{}.rejected", intent.strip_suffix(".request").unwrap_or(intent))
}

#[cfg(test)]
mod tests {
    use bos_core::core::command::ActorRequirement;
    use bos_core::core::command::CommandKind;
    use bos_core::core::command::CommandSpec;
    use bos_core::core::command::ScopeRequirement;
    use bos_core::core::identifiers::ActorId;
    use bos_core::core::identifiers::BranchId;
    use bos_core::core::identifiers::CorrelationId;
    use bos_core::core::identifiers::TenantId;
    use time::OffsetDateTime;

    use super::*;

    #[test]
    fn rejected_event_type_strips_request_and_appends_rejected() {
        assert_eq!(rejected_event_type("cash.session.open.request"), "cash.session.open.rejected");
    }

    #[test]
    fn rejected_event_type_is_stable_without_the_request_suffix() {
        assert_eq!(rejected_event_type("cash.session.open"), "cash.session.open.rejected");
    }

    #[test]
    fn mechanical_fields_carries_envelope_identity_and_nulls_absent_branch() {
        let command = Command::new(CommandSpec {
            intent: "cash.session.open.request".to_string(),
            tenant_id: TenantId::new(),
            branch_id: None,
            actor_kind: bos_core::core::command::ActorKind::Human,
            actor_id: ActorId::new("teller-1").expect("valid"),
            payload: Payload::new(),
            issued_at: OffsetDateTime::now_utc(),
            correlation_id: CorrelationId::new(),
            scope_requirement: ScopeRequirement::BusinessAllowed,
            actor_requirement: ActorRequirement::ActorRequired,
            kind: CommandKind::Write,
        })
        .expect("valid command");

        let fields = mechanical_fields(&command);
        assert_eq!(fields.get("branch_id"), Some(&Value::Null));
        assert_eq!(fields.get("actor_kind"), Some(&Value::String("HUMAN".to_string())));
        assert!(fields.contains_key("tenant_id"));
        assert!(fields.contains_key("issued_at"));
    }

    #[test]
    fn mechanical_fields_carries_branch_id_when_present() {
        let branch_id = BranchId::new();
        let command = Command::new(CommandSpec {
            intent: "cash.session.open.request".to_string(),
            tenant_id: TenantId::new(),
            branch_id: Some(branch_id),
            actor_kind: bos_core::core::command::ActorKind::Human,
            actor_id: ActorId::new("teller-1").expect("valid"),
            payload: Payload::new(),
            issued_at: OffsetDateTime::now_utc(),
            correlation_id: CorrelationId::new(),
            scope_requirement: ScopeRequirement::BranchRequired,
            actor_requirement: ActorRequirement::ActorRequired,
            kind: CommandKind::Write,
        })
        .expect("valid command");

        let fields = mechanical_fields(&command);
        assert_eq!(fields.get("branch_id"), Some(&Value::String(branch_id.to_string())));
    }
}
