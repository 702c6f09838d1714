// demos/cash-engine/src/commands.rs
// ============================================================================
// Module: Cash Engine Command/Event Vocabulary
// Description: The closed set of intent and event-type strings this engine owns.
// Purpose: Give every other module one place to read these names from,
//          rather than re-typing string literals (§6 "Event naming law").
// Dependencies: none
// ============================================================================

/// Opens a cash session against a drawer.
pub const OPEN_SESSION_INTENT: &str = "cash.session.open.request";
/// Records a payment against an open session.
pub const RECORD_PAYMENT_INTENT: &str = "cash.payment.record.request";
/// Closes an open session.
pub const CLOSE_SESSION_INTENT: &str = "cash.session.close.request";

/// Emitted when [`OPEN_SESSION_INTENT`] is accepted.
pub const SESSION_OPENED_EVENT: &str = "cash.session.opened.v1";
/// Emitted when [`RECORD_PAYMENT_INTENT`] is accepted.
pub const PAYMENT_RECORDED_EVENT: &str = "cash.payment.recorded.v1";
/// Emitted when [`CLOSE_SESSION_INTENT`] is accepted.
pub const SESSION_CLOSED_EVENT: &str = "cash.session.closed.v1";

/// Returns every command type this engine owns.
#[must_use]
pub fn owned_command_types() -> [&'static str; 3] {
    [OPEN_SESSION_INTENT, RECORD_PAYMENT_INTENT, CLOSE_SESSION_INTENT]
}

/// Returns every event type this engine registers at startup.
#[must_use]
pub fn owned_event_types() -> [&'static str; 3] {
    [SESSION_OPENED_EVENT, PAYMENT_RECORDED_EVENT, SESSION_CLOSED_EVENT]
}
