// demos/inventory-engine/src/lib.rs
// ============================================================================
// Module: Inventory Engine
// Description: Illustrative engine managing a FIFO/LIFO/WAC lot ledger per
//              `(item, location)`.
// Purpose: Exercise the Engine Contract (§4.4) end to end for scenario S2
//          ("FIFO spanning two lots") and the branch-scope violation of S4.
// Dependencies: bos-contract, bos-core, bos-dispatcher, bos-events,
//               bos-projection, serde_json, uuid
// ============================================================================

//! ## Overview
//! The inventory engine owns two command types — receive and issue — and
//! folds their accepted events into a [`projection::InventoryProjection`]
//! keyed by `(item, location)`. Valuation (FIFO/LIFO/WAC) is resolved per
//! issue command rather than fixed per item, matching §3's "per item" wording
//! loosely: this illustrative engine lets the caller choose a method per
//! issue, which is a superset of "fixed per item" and still exercises every
//! consumption path.

#![forbid(unsafe_code)]

pub mod commands;
pub mod handler;
pub mod lot_ledger;
pub mod payload;
pub mod projection;

pub use handler::ENABLE_INVENTORY_ENGINE_FLAG_KEY;
pub use handler::InventoryEngine;
pub use lot_ledger::ConsumptionResult;
pub use lot_ledger::Lot;
pub use lot_ledger::LotDraw;
pub use lot_ledger::LotLedger;
pub use lot_ledger::ValuationMethod;
pub use projection::InventoryProjection;

use bos_contract::EngineManifest;

/// Builds the [`EngineManifest`] this engine satisfies, for use with
/// [`bos_contract::check_conformance`].
#[must_use]
pub fn manifest() -> EngineManifest {
    EngineManifest::new("inventory")
        .with_command_type(commands::RECEIVE_STOCK_INTENT)
        .with_command_type(commands::ISSUE_STOCK_INTENT)
        .with_event_type(commands::STOCK_RECEIVED_EVENT)
        .with_event_type(commands::STOCK_ISSUED_EVENT)
        .with_builder(commands::RECEIVE_STOCK_INTENT, commands::STOCK_RECEIVED_EVENT)
        .with_builder(commands::ISSUE_STOCK_INTENT, commands::STOCK_ISSUED_EVENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_is_conformant() {
        assert!(bos_contract::check_conformance(&manifest()).is_ok());
    }
}
