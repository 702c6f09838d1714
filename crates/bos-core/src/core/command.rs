// crates/bos-core/src/core/command.rs
// ============================================================================
// Module: BOS Command Model
// Description: The immutable Command value — the sole unit of state-change intent.
// Purpose: Guarantee, at construction time, that every Command reaching the
//          dispatcher already satisfies the pipeline's structural invariants.
// Dependencies: serde_json, thiserror, time, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A [`Command`] is frozen the moment [`Command::new`] returns `Ok`. There is
//! no setter anywhere on this type; every field is read through an accessor.
//! Invariants:
//! - `intent` is lowercase, `.`-separated, at least four segments, and its
//!   last segment is literally `request`.
//! - `source_engine` always equals the first segment of `intent` — it is
//!   derived, never supplied independently, so the two cannot drift.
//! - `branch_id` may only be absent when `scope_requirement` is
//!   `BUSINESS_ALLOWED`.

use serde_json::Map;
use serde_json::Value;
use time::OffsetDateTime;

use crate::core::identifiers::ActorId;
use crate::core::identifiers::BranchId;
use crate::core::identifiers::CommandId;
use crate::core::identifiers::CorrelationId;
use crate::core::identifiers::TenantId;

/// Structured command/event payload: a JSON object of scalars, lists, and
/// nested maps. No opaque binary blobs are representable.
pub type Payload = Map<String, Value>;

/// Actor kind issuing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// A human operator.
    Human,
    /// The system itself (scheduled jobs, internal reactions).
    System,
    /// An unattended device (POS terminal, kiosk, sensor).
    Device,
    /// An AI agent, subject to the AI guardrail.
    Ai,
}

/// Business-scope requirement for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRequirement {
    /// The command may target the business as a whole; a branch is optional.
    BusinessAllowed,
    /// The command must target a specific branch.
    BranchRequired,
}

/// Actor-presence requirement for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRequirement {
    /// An authenticated actor must be present and authorised.
    ActorRequired,
    /// The command may be issued without actor authorization (SYSTEM-class
    /// commands emitted by the pipeline's own internal reactions).
    SystemAllowed,
}

/// Read/write classification used by the resilience guard.
///
/// This is a REDESIGN of the reference's string-sniffing heuristic ("infer
/// write from the action segment"): an explicit, closed classification set at
/// construction time rather than inferred from the intent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// The command only reads state; never rejected for resilience.
    Read,
    /// The command may mutate state; rejected when the system is degraded.
    Write,
}

/// Immutable declaration of business intent entering the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    id: CommandId,
    intent: String,
    source_engine: String,
    tenant_id: TenantId,
    branch_id: Option<BranchId>,
    actor_kind: ActorKind,
    actor_id: ActorId,
    payload: Payload,
    issued_at: OffsetDateTime,
    correlation_id: CorrelationId,
    scope_requirement: ScopeRequirement,
    actor_requirement: ActorRequirement,
    kind: CommandKind,
}

/// Parameters accepted by [`Command::new`].
///
/// Grouped into one struct because the constructor otherwise takes more
/// positional arguments than is readable at a call site.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Typed intent string, e.g. `cash.session.open.request`.
    pub intent: String,
    /// Tenant the command targets.
    pub tenant_id: TenantId,
    /// Branch the command targets, if any.
    pub branch_id: Option<BranchId>,
    /// Actor kind issuing the command.
    pub actor_kind: ActorKind,
    /// Actor identifier issuing the command.
    pub actor_id: ActorId,
    /// Structured payload.
    pub payload: Payload,
    /// Issue timestamp, supplied by an injected [`crate::core::time::Clock`].
    pub issued_at: OffsetDateTime,
    /// Correlation identifier grouping related work.
    pub correlation_id: CorrelationId,
    /// Business-scope requirement.
    pub scope_requirement: ScopeRequirement,
    /// Actor-presence requirement.
    pub actor_requirement: ActorRequirement,
    /// Read/write classification.
    pub kind: CommandKind,
}

impl Command {
    /// Constructs a command, validating every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the intent grammar is invalid, or when
    /// `branch_id` is absent while `scope_requirement` is `BRANCH_REQUIRED`.
    pub fn new(spec: CommandSpec) -> Result<Self, CommandError> {
        let source_engine = validate_intent(&spec.intent)?;

        if matches!(spec.scope_requirement, ScopeRequirement::BranchRequired) && spec.branch_id.is_none() {
            return Err(CommandError::BranchRequiredMissing);
        }

        Ok(Self {
            id: CommandId::new(),
            intent: spec.intent,
            source_engine,
            tenant_id: spec.tenant_id,
            branch_id: spec.branch_id,
            actor_kind: spec.actor_kind,
            actor_id: spec.actor_id,
            payload: spec.payload,
            issued_at: spec.issued_at,
            correlation_id: spec.correlation_id,
            scope_requirement: spec.scope_requirement,
            actor_requirement: spec.actor_requirement,
            kind: spec.kind,
        })
    }

    /// Returns the command identifier.
    #[must_use]
    pub const fn id(&self) -> CommandId {
        self.id
    }

    /// Returns the command intent string.
    #[must_use]
    pub fn intent(&self) -> &str {
        &self.intent
    }

    /// Returns the source engine (first intent segment).
    #[must_use]
    pub fn source_engine(&self) -> &str {
        &self.source_engine
    }

    /// Returns the target tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the target branch, if any.
    #[must_use]
    pub const fn branch_id(&self) -> Option<BranchId> {
        self.branch_id
    }

    /// Returns the issuing actor's kind.
    #[must_use]
    pub const fn actor_kind(&self) -> ActorKind {
        self.actor_kind
    }

    /// Returns the issuing actor's identifier.
    #[must_use]
    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    /// Returns the structured payload.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the issue timestamp.
    #[must_use]
    pub const fn issued_at(&self) -> OffsetDateTime {
        self.issued_at
    }

    /// Returns the correlation identifier.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Returns the scope requirement.
    #[must_use]
    pub const fn scope_requirement(&self) -> ScopeRequirement {
        self.scope_requirement
    }

    /// Returns the actor requirement.
    #[must_use]
    pub const fn actor_requirement(&self) -> ActorRequirement {
        self.actor_requirement
    }

    /// Returns the read/write classification.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }
}

/// Validates the intent grammar and returns the derived source engine.
fn validate_intent(intent: &str) -> Result<String, CommandError> {
    if intent != intent.to_ascii_lowercase() {
        return Err(CommandError::InvalidIntent);
    }
    let segments: Vec<&str> = intent.split('.').collect();
    if segments.len() < 4 {
        return Err(CommandError::InvalidIntent);
    }
    if segments.last().copied() != Some("request") {
        return Err(CommandError::InvalidIntent);
    }
    let Some(first) = segments.first() else {
        return Err(CommandError::InvalidIntent);
    };
    if first.is_empty() {
        return Err(CommandError::InvalidIntent);
    }
    Ok((*first).to_string())
}

/// Errors constructing a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The intent string does not satisfy the command grammar: lowercase,
    /// `.`-separated, at least four segments, last segment `request`.
    #[error("command intent is not a valid `engine.domain.action.request` string")]
    InvalidIntent,
    /// `scope_requirement` was `BRANCH_REQUIRED` but no `branch_id` was given.
    #[error("branch id is required when scope requirement is BRANCH_REQUIRED")]
    BranchRequiredMissing,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(intent: &str, scope: ScopeRequirement, branch_id: Option<BranchId>) -> CommandSpec {
        CommandSpec {
            intent: intent.to_string(),
            tenant_id: TenantId::new(),
            branch_id,
            actor_kind: ActorKind::Human,
            actor_id: ActorId::new("user-1").expect("non-empty"),
            payload: Payload::new(),
            issued_at: OffsetDateTime::now_utc(),
            correlation_id: CorrelationId::new(),
            scope_requirement: scope,
            actor_requirement: ActorRequirement::ActorRequired,
            kind: CommandKind::Write,
        }
    }

    #[test]
    fn derives_source_engine_from_first_segment() {
        let command = Command::new(spec("cash.session.open.request", ScopeRequirement::BusinessAllowed, None))
            .expect("valid command");
        assert_eq!(command.source_engine(), "cash");
    }

    #[test]
    fn rejects_intent_with_too_few_segments() {
        assert!(matches!(
            Command::new(spec("cash.open.request", ScopeRequirement::BusinessAllowed, None)),
            Err(CommandError::InvalidIntent)
        ));
    }

    #[test]
    fn rejects_intent_not_ending_in_request() {
        assert!(matches!(
            Command::new(spec("cash.session.open.v1", ScopeRequirement::BusinessAllowed, None)),
            Err(CommandError::InvalidIntent)
        ));
    }

    #[test]
    fn rejects_uppercase_intent() {
        assert!(matches!(
            Command::new(spec("Cash.session.open.request", ScopeRequirement::BusinessAllowed, None)),
            Err(CommandError::InvalidIntent)
        ));
    }

    #[test]
    fn branch_required_without_branch_id_fails_construction() {
        assert!(matches!(
            Command::new(spec("inventory.stock.receive.request", ScopeRequirement::BranchRequired, None)),
            Err(CommandError::BranchRequiredMissing)
        ));
    }

    #[test]
    fn branch_allowed_without_branch_id_succeeds() {
        assert!(Command::new(spec("cash.session.open.request", ScopeRequirement::BusinessAllowed, None)).is_ok());
    }
}
