// demos/accounting-engine/src/commands.rs
// ============================================================================
// Module: Accounting Engine Command/Event Vocabulary
// Description: The closed set of intent and event-type strings this engine owns.
// Purpose: Give every other module one place to read these names from
//          (§6 "Event naming law").
// Dependencies: none
// ============================================================================

/// Posts a double-entry journal entry.
pub const POST_JOURNAL_ENTRY_INTENT: &str = "accounting.journal.post.request";
/// Records a new obligation (e.g. an invoice) against the business.
pub const RECORD_OBLIGATION_INTENT: &str = "accounting.obligation.record.request";
/// Applies a fulfilment (e.g. a receipt) against an existing obligation.
pub const FULFILL_OBLIGATION_INTENT: &str = "accounting.obligation.fulfill.request";

/// Emitted when [`POST_JOURNAL_ENTRY_INTENT`] is accepted.
pub const JOURNAL_POSTED_EVENT: &str = "accounting.journal.posted.v1";
/// Emitted when [`RECORD_OBLIGATION_INTENT`] is accepted.
pub const OBLIGATION_RECORDED_EVENT: &str = "accounting.obligation.recorded.v1";
/// Emitted when [`FULFILL_OBLIGATION_INTENT`] is accepted.
pub const OBLIGATION_FULFILLED_EVENT: &str = "accounting.obligation.fulfilled.v1";

/// Returns every command type this engine owns.
#[must_use]
pub fn owned_command_types() -> [&'static str; 3] {
    [POST_JOURNAL_ENTRY_INTENT, RECORD_OBLIGATION_INTENT, FULFILL_OBLIGATION_INTENT]
}

/// Returns every event type this engine registers at startup.
#[must_use]
pub fn owned_event_types() -> [&'static str; 3] {
    [JOURNAL_POSTED_EVENT, OBLIGATION_RECORDED_EVENT, OBLIGATION_FULFILLED_EVENT]
}
