// crates/bos-dispatcher/src/dispatcher.rs
// ============================================================================
// Module: BOS Command Dispatcher
// Description: The sole entrance for state change — orchestrates structural
//              validation, context validation, the fixed eleven-row guard
//              stack, handler dispatch, and outcome reporting.
// Purpose: Implement §4.1 "Command Dispatcher" end to end.
// Dependencies: bos-config, bos-core, bos-events, bos-security, std::sync
// ============================================================================

//! ## Overview
//! `Dispatcher` owns every piece of state the guard stack needs across calls
//! (the rate limiter's buckets, the anomaly detector's activity log, the
//! event-type registry) and is handed, per call, the request-scoped values a
//! transport layer resolves fresh each time (the command, the actor, the
//! business context, the tenant scope, and the system health snapshot). The
//! guard stack runs in exactly the order fixed by §4.2 and short-circuits at
//! the first denial; [`check_anomaly`] is the only row that can pass the
//! command through while still annotating the outcome.
//!
//! Governance guards (feature flag, compliance, document validation) fail
//! open when their provider is entirely absent or reports an error; security
//! guards (scope, tenant isolation, rate limiter, permission, AI guardrail)
//! fail closed. This asymmetry is deliberate (§7) and is preserved exactly at
//! every call site below rather than centralised into one policy, since the
//! correct failure direction differs per guard.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;

use bos_config::BosConfig;
use bos_core::core::command::ActorRequirement;
use bos_core::core::command::Command;
use bos_core::core::context::ActorContext;
use bos_core::core::context::BusinessContext;
use bos_core::core::context::TenantScope;
use bos_core::core::health::SystemHealth;
use bos_core::core::identifiers::TenantId;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;
use bos_core::core::time::Clock;
use bos_core::interfaces::providers::DocumentTemplate;
use bos_core::interfaces::providers::FlagStatus;
use bos_events::EventTypeRegistry;
use bos_events::PersistenceSink;
use bos_security::AiAction;
use bos_security::AiActionRequest;
use bos_security::AiGuardrailVerdict;
use bos_security::AnomalyDetector;
use bos_security::RateLimitDecision;
use bos_security::RateLimiter;
use bos_security::Severity;
use bos_security::ai_guardrail;
use bos_security::resilience;
use bos_security::tenant_isolation;

use crate::guards;
use crate::outcome::CommandHandler;
use crate::outcome::DispatcherError;
use crate::outcome::Outcome;

/// The feature-flag key gating the compliance guard (§4.2 row 9). Opt-in: a
/// tenant with no record for this key is treated as not enrolled, so the
/// compliance guard is skipped entirely — unlike the per-intent flags
/// resolved at row 6, where an unmapped intent bypasses the guard rather than
/// an unmapped tenant skipping it.
pub const COMPLIANCE_FLAG_KEY: &str = "ENABLE_COMPLIANCE_CHECKS";

/// The feature-flag key gating the document validation guard (§4.2 row 10),
/// opt-in under the same default-off semantics as [`COMPLIANCE_FLAG_KEY`].
pub const DOCUMENT_DESIGNER_FLAG_KEY: &str = "ENABLE_DOCUMENT_DESIGNER";

/// Orchestrates the fixed guard stack and handler dispatch for every command
/// entering the pipeline.
pub struct Dispatcher {
    clock: Arc<dyn Clock>,
    rate_limiter: RateLimiter,
    anomaly_detector: AnomalyDetector,
    event_registry: Arc<EventTypeRegistry>,
    sink: Arc<dyn PersistenceSink>,
    handlers: RwLock<BTreeMap<String, Arc<dyn CommandHandler>>>,
    feature_flag_keys: RwLock<BTreeMap<String, String>>,
    document_types: RwLock<BTreeMap<String, String>>,
    default_templates: RwLock<BTreeMap<String, DocumentTemplate>>,
}

impl Dispatcher {
    /// Constructs a dispatcher with no handlers registered yet.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, config: BosConfig, sink: Arc<dyn PersistenceSink>) -> Self {
        Self {
            clock,
            rate_limiter: RateLimiter::new(config.rate_limiter),
            anomaly_detector: AnomalyDetector::new(config.anomaly_detector),
            event_registry: Arc::new(EventTypeRegistry::new()),
            sink,
            handlers: RwLock::new(BTreeMap::new()),
            feature_flag_keys: RwLock::new(BTreeMap::new()),
            document_types: RwLock::new(BTreeMap::new()),
            default_templates: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the event-type registry engines register their owned event
    /// types against at startup (§4.4 item 2).
    #[must_use]
    pub fn event_registry(&self) -> &Arc<EventTypeRegistry> {
        &self.event_registry
    }

    /// Registers `handler` as the owner of `intent` (§4.4 item 5).
    ///
    /// Registering twice for the same intent replaces the previous handler.
    pub fn register_handler(&self, intent: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.write().unwrap_or_else(std::sync::PoisonError::into_inner).insert(intent.into(), handler);
    }

    /// Maps `intent` to the feature-flag key that gates it at guard row 6.
    ///
    /// An intent with no mapping bypasses the feature-flag guard entirely.
    pub fn register_feature_flag_key(&self, intent: impl Into<String>, flag_key: impl Into<String>) {
        self.feature_flag_keys.write().unwrap_or_else(std::sync::PoisonError::into_inner).insert(intent.into(), flag_key.into());
    }

    /// Maps `intent` to the document type it requires a resolved template for
    /// at guard row 10. An intent with no mapping bypasses document
    /// validation entirely, regardless of [`DOCUMENT_DESIGNER_FLAG_KEY`].
    pub fn register_document_type(&self, intent: impl Into<String>, doc_type: impl Into<String>) {
        self.document_types.write().unwrap_or_else(std::sync::PoisonError::into_inner).insert(intent.into(), doc_type.into());
    }

    /// Registers a built-in fallback template for `doc_type`, used when no
    /// provider-resolved template is active.
    pub fn register_default_template(&self, doc_type: impl Into<String>, template: DocumentTemplate) {
        self.default_templates.write().unwrap_or_else(std::sync::PoisonError::into_inner).insert(doc_type.into(), template);
    }

    /// Dispatches `command` through the full pipeline (§4.1).
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::NoHandler`] when no handler is registered
    /// for the command's intent — a wiring defect, not a policy rejection.
    pub fn dispatch(
        &self,
        command: &Command,
        actor: &ActorContext,
        context: &dyn BusinessContext,
        tenant_scope: &TenantScope,
        health: &SystemHealth,
    ) -> Result<Outcome, DispatcherError> {
        // Step 1, structural validation: a no-op here. `Command::new` already
        // refused to construct a structurally invalid value (§4.1 step 1).

        if let Some(reason) = self.run_guard_stack(command, actor, context, tenant_scope, health) {
            self.record_activity(command, actor, true);
            return Ok(Outcome::Rejected { reason });
        }

        let anomaly_warning = self.anomaly_warning(command, actor);

        let handlers = self.handlers.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(handler) = handlers.get(command.intent()).cloned() else {
            drop(handlers);
            return Err(DispatcherError::NoHandler(command.intent().to_string()));
        };
        drop(handlers);

        match handler.handle(command) {
            Ok(result) => {
                self.record_activity(command, actor, false);
                Ok(Outcome::Accepted { result, anomaly_warning })
            }
            Err(reason) => {
                self.record_activity(command, actor, true);
                Ok(Outcome::Rejected { reason })
            }
        }
    }

    /// Runs guard rows 1 through 4 and 6 through 11 in order, returning the
    /// first rejection. Row 5 (anomaly) is evaluated separately by
    /// [`Self::anomaly_warning`] because a `WARN` verdict does not reject.
    fn run_guard_stack(
        &self,
        command: &Command,
        actor: &ActorContext,
        context: &dyn BusinessContext,
        tenant_scope: &TenantScope,
        health: &SystemHealth,
    ) -> Option<RejectionReason> {
        // Row 1: resilience.
        if let Some(reason) = resilience::check(health, command.kind()) {
            return Some(reason);
        }

        // Row 2: scope guard.
        if let Some(reason) = guards::check_scope(command, context) {
            return Some(reason);
        }

        // Row 3: tenant isolation. SYSTEM actors bypass this check entirely
        // (§4.2 row 3 "Bypass: SYSTEM actor") — they are the pipeline's own
        // internal reactions, not actor-issued requests subject to a
        // per-actor tenant scope.
        if command.actor_kind() != bos_core::core::command::ActorKind::System {
            if let Some(reason) = tenant_isolation::check(tenant_scope, command.tenant_id(), command.branch_id()) {
                return Some(reason);
            }
        }

        // Row 4: rate limiter.
        if let Some(reason) = self.check_rate_limit(command, actor) {
            return Some(reason);
        }

        // Row 5: anomaly detector. A BLOCK verdict rejects here; a WARN
        // verdict is deferred to `anomaly_warning` and does not reject.
        let verdict = self.anomaly_detector.evaluate(actor.actor_id(), command.tenant_id(), self.clock.now());
        if verdict.severity == Severity::Block {
            return Some(RejectionReason::new(ReasonCode::SecurityAnomalyDetected, verdict.reason, "anomaly_detector"));
        }

        // Row 6: feature flag.
        if let Some(reason) = self.check_feature_flag(command, context) {
            return Some(reason);
        }

        // Row 7: actor scope authorization — must run before row 8 (§9).
        if let Some(reason) = guards::check_actor_scope(command, actor, context) {
            return Some(reason);
        }

        // Row 8: permission.
        if let Some(reason) = self.check_permission(command, actor, context) {
            return Some(reason);
        }

        // Row 9: compliance.
        if let Some(reason) = self.check_compliance(command, context) {
            return Some(reason);
        }

        // Row 10: document validation.
        if let Some(reason) = self.check_document(command, context) {
            return Some(reason);
        }

        // Row 11: AI guardrail.
        self.check_ai_guardrail(command, context)
    }

    fn check_rate_limit(&self, command: &Command, actor: &ActorContext) -> Option<RejectionReason> {
        match self.rate_limiter.check(actor.actor_id(), command.tenant_id(), command.actor_kind(), self.clock.now()) {
            RateLimitDecision::Allowed => None,
            RateLimitDecision::Denied { retry_after_seconds } => Some(RejectionReason::new(
                ReasonCode::RateLimitExceeded,
                format!("rate limit exceeded; retry after {retry_after_seconds}s"),
                "rate_limiter",
            )),
        }
    }

    fn anomaly_warning(&self, command: &Command, actor: &ActorContext) -> Option<bos_security::AnomalyVerdict> {
        let verdict = self.anomaly_detector.evaluate(actor.actor_id(), command.tenant_id(), self.clock.now());
        (verdict.severity == Severity::Warn).then_some(verdict)
    }

    fn record_activity(&self, command: &Command, actor: &ActorContext, was_rejected: bool) {
        self.anomaly_detector.record(actor.actor_id(), command.tenant_id(), command.branch_id(), command.intent(), self.clock.now(), was_rejected);
    }

    /// Governance guard: absence of a flag mapping for this intent, absence
    /// of a provider, or a provider error all fail open (§7).
    fn check_feature_flag(&self, command: &Command, context: &dyn BusinessContext) -> Option<RejectionReason> {
        let flag_key = self.feature_flag_keys.read().unwrap_or_else(std::sync::PoisonError::into_inner).get(command.intent()).cloned()?;
        let provider = context.get_feature_flag_provider()?;
        let Ok(records) = provider.flags_for_tenant(command.tenant_id()) else {
            return None;
        };
        match guards::resolve_flag(&records, &flag_key, command.branch_id()) {
            Some(FlagStatus::Disabled) => Some(RejectionReason::new(
                ReasonCode::FeatureDisabled,
                format!("feature `{flag_key}` is disabled"),
                "feature_flag_guard",
            )),
            Some(FlagStatus::Enabled) | None => None,
        }
    }

    /// Security guard: absence of a provider or any provider error fails
    /// closed (§7) — permission evaluation is deny-by-default throughout.
    fn check_permission(&self, command: &Command, actor: &ActorContext, context: &dyn BusinessContext) -> Option<RejectionReason> {
        if matches!(command.actor_requirement(), ActorRequirement::SystemAllowed) {
            return None;
        }
        let Some(provider) = context.get_permission_provider() else {
            return Some(RejectionReason::new(ReasonCode::PermissionDenied, "no permission provider is configured", guards::PERMISSION_POLICY_NAME));
        };
        let permission = match provider.permission_for_intent(command.intent()) {
            Ok(permission) => permission,
            Err(_) => {
                return Some(RejectionReason::new(ReasonCode::PermissionDenied, "permission provider failed to resolve the intent mapping", guards::PERMISSION_POLICY_NAME));
            }
        };
        let grants = match provider.grants_for_actor(actor.actor_id(), command.tenant_id()) {
            Ok(grants) => grants,
            Err(_) => {
                return Some(RejectionReason::new(ReasonCode::PermissionDenied, "permission provider failed to resolve actor grants", guards::PERMISSION_POLICY_NAME));
            }
        };
        guards::check_permission(command, permission.as_ref(), &grants)
    }

    /// Governance guard gated by [`COMPLIANCE_FLAG_KEY`]; unresolvable flag
    /// state, absence of a provider, or a provider error all fail open (§7).
    fn check_compliance(&self, command: &Command, context: &dyn BusinessContext) -> Option<RejectionReason> {
        if !self.governance_flag_enabled(command.tenant_id(), command.branch_id(), COMPLIANCE_FLAG_KEY, context) {
            return None;
        }
        let provider = context.get_compliance_provider()?;
        let Ok(result) = provider.evaluate(command, context) else {
            return None;
        };
        if result.allowed {
            return None;
        }
        let code = result.rejection_code.unwrap_or(ReasonCode::ComplianceViolation);
        let message = if result.violations.is_empty() {
            "compliance evaluation denied the command".to_string()
        } else {
            result.violations.iter().map(|violation| violation.message.as_str()).collect::<Vec<_>>().join("; ")
        };
        Some(RejectionReason::new(code, message, "compliance_guard"))
    }

    /// Governance guard gated by [`DOCUMENT_DESIGNER_FLAG_KEY`]. Absence of a
    /// provider-resolved template falls back to a dispatcher-registered
    /// default; only when neither resolves is the command rejected — a
    /// provider error still falls open, consistent with the other governance
    /// guards, but a genuinely unresolvable document type is a configuration
    /// defect worth surfacing rather than silently passing.
    fn check_document(&self, command: &Command, context: &dyn BusinessContext) -> Option<RejectionReason> {
        if !self.governance_flag_enabled(command.tenant_id(), command.branch_id(), DOCUMENT_DESIGNER_FLAG_KEY, context) {
            return None;
        }
        let doc_type = self.document_types.read().unwrap_or_else(std::sync::PoisonError::into_inner).get(command.intent()).cloned()?;

        let provider_templates = context
            .get_document_provider()
            .and_then(|provider| provider.templates_for_tenant(command.tenant_id()).ok())
            .unwrap_or_default();

        let template = guards::resolve_template(&provider_templates, &doc_type, command.branch_id()).cloned().or_else(|| {
            self.default_templates.read().unwrap_or_else(std::sync::PoisonError::into_inner).get(&doc_type).cloned()
        });

        let Some(template) = template else {
            return Some(RejectionReason::new(
                ReasonCode::DocumentTemplateNotFound,
                format!("no active template resolves for document type `{doc_type}`"),
                guards::DOCUMENT_POLICY_NAME,
            ));
        };

        guards::check_required_fields(&template, command.payload())
    }

    /// Resolves a governance-gating flag (compliance, document designer) to
    /// an enabled/disabled verdict. Unlike the per-intent flag at row 6, an
    /// unmapped tenant here means "not enrolled" — the default is off, not
    /// on — and any provider absence or error also resolves to "not enrolled"
    /// (fail open).
    fn governance_flag_enabled(&self, tenant_id: TenantId, branch_id: Option<bos_core::core::identifiers::BranchId>, flag_key: &str, context: &dyn BusinessContext) -> bool {
        let Some(provider) = context.get_feature_flag_provider() else {
            return false;
        };
        let Ok(records) = provider.flags_for_tenant(tenant_id) else {
            return false;
        };
        matches!(guards::resolve_flag(&records, flag_key, branch_id), Some(FlagStatus::Enabled))
    }

    /// Security guard: only applies to `AI`-kind actors. The dispatcher only
    /// ever classifies a dispatched command as `EXECUTE_COMMAND` — advisory
    /// AI actions (`ANALYZE`, `RECOMMEND`, `SIMULATE`, `FLAG_ANOMALY`,
    /// `PREPARE_COMMAND`) never produce a `Command` and so never reach this
    /// guard at all.
    fn check_ai_guardrail(&self, command: &Command, context: &dyn BusinessContext) -> Option<RejectionReason> {
        if command.actor_kind() != bos_core::core::command::ActorKind::Ai {
            return None;
        }
        let actor = ActorContext::from_actor_id(command.actor_kind(), command.actor_id().clone());
        let request = AiActionRequest {
            action: AiAction::ExecuteCommand,
            operation: action_segment(command.intent()),
            actor_tenant: command.tenant_id(),
            target_tenant: command.tenant_id(),
            has_automation_policy: context.has_ai_automation_policy(&actor),
        };
        match ai_guardrail::evaluate(&request) {
            AiGuardrailVerdict::Allowed { .. } => None,
            AiGuardrailVerdict::Denied(reason) => Some(reason),
        }
    }
}

/// Extracts the action segment (second-to-last, just before `request`) from
/// an already-validated intent string, e.g. `hr.staff.deletion.request` →
/// `deletion`. Used only to check the AI guardrail's forbidden-operations
/// list against a stable, engine-independent name.
fn action_segment(intent: &str) -> &str {
    let segments: Vec<&str> = intent.split('.').collect();
    if segments.len() < 2 {
        return intent;
    }
    segments[segments.len() - 2]
}
