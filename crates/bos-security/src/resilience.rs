// crates/bos-security/src/resilience.rs
// ============================================================================
// Module: BOS Resilience Guard
// Description: Gates write commands on `SystemHealth` mode.
// Purpose: Implement §4.5 "Resilience policy" and the guard at §4.2 row 1.
// Dependencies: bos-core
// ============================================================================

use bos_core::core::command::CommandKind;
use bos_core::core::health::SystemHealth;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;

/// The name this guard reports as `policy_name` on denial.
pub const POLICY_NAME: &str = "resilience_guard";

/// Rejects `kind` when `health` does not accept writes.
///
/// Read commands are never rejected by this guard (§4.5, §8 property 10).
#[must_use]
pub fn check(health: &SystemHealth, kind: CommandKind) -> Option<RejectionReason> {
    if matches!(kind, CommandKind::Read) || health.accepts_writes() {
        return None;
    }
    Some(RejectionReason::new(
        ReasonCode::SystemDegraded,
        format!("system is not accepting writes: {}", health.reason()),
        POLICY_NAME,
    ))
}
