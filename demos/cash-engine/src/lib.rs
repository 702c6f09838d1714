// demos/cash-engine/src/lib.rs
// ============================================================================
// Module: Cash Engine
// Description: Illustrative engine managing cash drawer sessions and payments.
// Purpose: Exercise the Engine Contract (§4.4) end to end for scenario S1
//          ("happy path cash session") and the feature-flag branch override
//          of S7.
// Dependencies: bos-contract, bos-core, bos-dispatcher, bos-events,
//               bos-projection, serde_json
// ============================================================================

//! ## Overview
//! A cash session is opened against a drawer with an opening balance,
//! accumulates recorded payments, and is closed against a caller-reported
//! closing balance. The engine owns three command types and emits one event
//! per accepted command; it never calls another engine directly.

#![forbid(unsafe_code)]

pub mod commands;
pub mod handler;
pub mod payload;
pub mod projection;

pub use handler::CashEngine;
pub use handler::ENABLE_CASH_ENGINE_FLAG_KEY;
pub use projection::CashProjection;
pub use projection::SessionRecord;
pub use projection::SessionStatus;

use bos_contract::EngineManifest;

/// Builds the [`EngineManifest`] this engine satisfies, for use with
/// [`bos_contract::check_conformance`].
#[must_use]
pub fn manifest() -> EngineManifest {
    EngineManifest::new("cash")
        .with_command_type(commands::OPEN_SESSION_INTENT)
        .with_command_type(commands::RECORD_PAYMENT_INTENT)
        .with_command_type(commands::CLOSE_SESSION_INTENT)
        .with_event_type(commands::SESSION_OPENED_EVENT)
        .with_event_type(commands::PAYMENT_RECORDED_EVENT)
        .with_event_type(commands::SESSION_CLOSED_EVENT)
        .with_builder(commands::OPEN_SESSION_INTENT, commands::SESSION_OPENED_EVENT)
        .with_builder(commands::RECORD_PAYMENT_INTENT, commands::PAYMENT_RECORDED_EVENT)
        .with_builder(commands::CLOSE_SESSION_INTENT, commands::SESSION_CLOSED_EVENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_is_conformant() {
        assert!(bos_contract::check_conformance(&manifest()).is_ok());
    }
}
