// demos/accounting-engine/src/lib.rs
// ============================================================================
// Module: Accounting Engine
// Description: Illustrative engine posting double-entry journal entries and
//              tracking obligation fulfilment.
// Purpose: Exercise the Engine Contract (§4.4) end to end for scenario S3
//          ("unbalanced journal") and the obligations-ledger rejection codes
//          `OBLIGATION_NOT_FOUND`/`OBLIGATION_OVERFULFILLED`.
// Dependencies: bos-contract, bos-core, bos-dispatcher, bos-events,
//               bos-projection, serde_json
// ============================================================================

//! ## Overview
//! A journal entry is a set of lines each posting a debit or credit against
//! an account; it is accepted only when debits equal credits across the
//! whole entry. An obligation is recorded with a total amount owed and
//! fulfilled incrementally; fulfilment beyond the remaining amount is
//! rejected. The engine owns three command types and emits one event per
//! accepted command; it never calls another engine directly.

#![forbid(unsafe_code)]

pub mod commands;
pub mod handler;
pub mod payload;
pub mod projection;

pub use handler::AccountingEngine;
pub use handler::ENABLE_ACCOUNTING_ENGINE_FLAG_KEY;
pub use projection::AccountingProjection;
pub use projection::ObligationRecord;

use bos_contract::EngineManifest;

/// Builds the [`EngineManifest`] this engine satisfies, for use with
/// [`bos_contract::check_conformance`].
#[must_use]
pub fn manifest() -> EngineManifest {
    EngineManifest::new("accounting")
        .with_command_type(commands::POST_JOURNAL_ENTRY_INTENT)
        .with_command_type(commands::RECORD_OBLIGATION_INTENT)
        .with_command_type(commands::FULFILL_OBLIGATION_INTENT)
        .with_event_type(commands::JOURNAL_POSTED_EVENT)
        .with_event_type(commands::OBLIGATION_RECORDED_EVENT)
        .with_event_type(commands::OBLIGATION_FULFILLED_EVENT)
        .with_builder(commands::POST_JOURNAL_ENTRY_INTENT, commands::JOURNAL_POSTED_EVENT)
        .with_builder(commands::RECORD_OBLIGATION_INTENT, commands::OBLIGATION_RECORDED_EVENT)
        .with_builder(commands::FULFILL_OBLIGATION_INTENT, commands::OBLIGATION_FULFILLED_EVENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_is_conformant() {
        assert!(bos_contract::check_conformance(&manifest()).is_ok());
    }
}
