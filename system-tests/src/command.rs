// system-tests/src/command.rs
// ============================================================================
// Module: Test Command Builder
// Description: A lower-ceremony constructor for `Command` values than
//              `CommandSpec` literals repeated at every test call site.
// Purpose: Keep scenario/invariant tests focused on the field that matters
//          to the assertion, defaulting everything else to a sane write
//          command issued "now" on the harness's clock.
// Dependencies: bos-core
// ============================================================================

use bos_core::core::command::ActorKind;
use bos_core::core::command::ActorRequirement;
use bos_core::core::command::Command;
use bos_core::core::command::CommandError;
use bos_core::core::command::CommandKind;
use bos_core::core::command::CommandSpec;
use bos_core::core::command::Payload;
use bos_core::core::command::ScopeRequirement;
use bos_core::core::identifiers::ActorId;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::CorrelationId;
use bos_core::core::identifiers::TenantId;
use time::OffsetDateTime;

/// Parameters for [`build_command`]; every field has an obvious default a
/// test can override only where the assertion cares.
#[derive(Debug, Clone)]
pub struct CommandParams {
    /// Intent string, e.g. `cash.session.open.request`.
    pub intent: String,
    /// Target tenant.
    pub tenant_id: TenantId,
    /// Target branch, if any.
    pub branch_id: Option<BranchId>,
    /// Issuing actor kind.
    pub actor_kind: ActorKind,
    /// Issuing actor id.
    pub actor_id: String,
    /// Structured payload.
    pub payload: Payload,
    /// Issue timestamp.
    pub issued_at: OffsetDateTime,
    /// Business-scope requirement.
    pub scope_requirement: ScopeRequirement,
    /// Actor-presence requirement.
    pub actor_requirement: ActorRequirement,
    /// Read/write classification.
    pub kind: CommandKind,
}

impl CommandParams {
    /// Starts from a `BusinessAllowed`, `ActorRequired`, `Write`, `Human`
    /// command for `intent` against `tenant_id`, issued at `issued_at`.
    #[must_use]
    pub fn new(intent: impl Into<String>, tenant_id: TenantId, issued_at: OffsetDateTime) -> Self {
        Self {
            intent: intent.into(),
            tenant_id,
            branch_id: None,
            actor_kind: ActorKind::Human,
            actor_id: "test-actor".to_string(),
            payload: Payload::new(),
            issued_at,
            scope_requirement: ScopeRequirement::BusinessAllowed,
            actor_requirement: ActorRequirement::ActorRequired,
            kind: CommandKind::Write,
        }
    }

    /// Sets the target branch and flips `scope_requirement` to `BranchRequired`.
    #[must_use]
    pub const fn branch_required(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self.scope_requirement = ScopeRequirement::BranchRequired;
        self
    }

    /// Sets the target branch without changing the scope requirement.
    #[must_use]
    pub const fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    /// Overrides the actor kind and id.
    #[must_use]
    pub fn with_actor(mut self, actor_kind: ActorKind, actor_id: impl Into<String>) -> Self {
        self.actor_kind = actor_kind;
        self.actor_id = actor_id.into();
        self
    }

    /// Overrides the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Overrides the actor-presence requirement.
    #[must_use]
    pub const fn with_actor_requirement(mut self, requirement: ActorRequirement) -> Self {
        self.actor_requirement = requirement;
        self
    }

    /// Overrides the read/write classification.
    #[must_use]
    pub const fn with_kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Constructs a [`Command`] from `params`, generating a fresh correlation id.
///
/// # Errors
///
/// Returns [`CommandError`] under the same conditions as [`Command::new`].
pub fn build_command(params: CommandParams) -> Result<Command, CommandError> {
    Command::new(CommandSpec {
        intent: params.intent,
        tenant_id: params.tenant_id,
        branch_id: params.branch_id,
        actor_kind: params.actor_kind,
        actor_id: ActorId::new(params.actor_id).unwrap_or_else(|_| ActorId::new("test-actor").expect("non-empty literal")),
        payload: params.payload,
        issued_at: params.issued_at,
        correlation_id: CorrelationId::new(),
        scope_requirement: params.scope_requirement,
        actor_requirement: params.actor_requirement,
        kind: params.kind,
    })
}
