// demos/inventory-engine/src/projection.rs
// ============================================================================
// Module: Inventory Engine Projection
// Description: The read model this engine folds its own accepted events into.
// Purpose: Implement §4.3 "Projection apply" over a keyed lot ledger per
//          `(item, location)`, plus an item-level valuation-method table.
// Dependencies: bos-core, bos-projection, serde_json
// ============================================================================

use std::sync::Mutex;

use bos_core::core::command::Payload;
use bos_projection::ProjectionStore;
use bos_projection::ProjectionTable;
use serde_json::Value;

use crate::commands;
use crate::lot_ledger::ConsumptionResult;
use crate::lot_ledger::LotLedger;
use crate::lot_ledger::ValuationMethod;

/// Reads a string field from `payload`, or `""` if absent or the wrong type.
fn str_field(payload: &Payload, field: &str) -> String {
    payload.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Reads an integer field from `payload`, or `0` if absent or the wrong type.
fn i64_field(payload: &Payload, field: &str) -> i64 {
    payload.get(field).and_then(Value::as_i64).unwrap_or_default()
}

/// Parses a valuation-method field, defaulting to FIFO when absent or
/// unrecognised.
fn method_field(payload: &Payload, field: &str) -> ValuationMethod {
    match payload.get(field).and_then(Value::as_str) {
        Some("LIFO") => ValuationMethod::Lifo,
        Some("WAC") => ValuationMethod::Wac,
        _ => ValuationMethod::Fifo,
    }
}

/// `(item, location)` key the lot-ledger table is indexed by.
type LedgerKey = (String, String);

/// The inventory engine's read model: one [`LotLedger`] per `(item,
/// location)`, guarded individually so concurrent receives/issues against
/// different keys never contend.
#[derive(Debug, Default)]
pub struct InventoryProjection {
    ledgers: ProjectionTable<LedgerKey, LedgerSnapshot>,
}

/// A cloneable snapshot of one ledger's lots, stored behind
/// [`ProjectionTable`]'s clone-on-read contract.
///
/// [`ProjectionTable`] requires `V: Clone`, but [`LotLedger`] is mutated
/// in place during consumption; this wrapper keeps the ledger itself behind
/// an `Arc<Mutex<_>>` so every clone of the snapshot shares the same
/// underlying state rather than diverging.
#[derive(Debug, Clone, Default)]
struct LedgerSnapshot(std::sync::Arc<Mutex<LotLedger>>);

impl InventoryProjection {
    /// Creates an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total remaining quantity at `(item, location)`, or `0`
    /// when no ledger exists yet.
    #[must_use]
    pub fn stock_on_hand(&self, item: &str, location: &str) -> i64 {
        self.ledger_for(item, location).0.lock().unwrap_or_else(std::sync::PoisonError::into_inner).total_remaining()
    }

    /// Returns the total stock value at `(item, location)`
    /// (`Σ remaining_qty · unit_cost`), or `0` when no ledger exists yet.
    #[must_use]
    pub fn stock_value(&self, item: &str, location: &str) -> i64 {
        self.ledger_for(item, location).0.lock().unwrap_or_else(std::sync::PoisonError::into_inner).total_value()
    }

    /// Returns the number of lots (exhausted or not) at `(item, location)`.
    #[must_use]
    pub fn lot_count(&self, item: &str, location: &str) -> usize {
        self.ledger_for(item, location).0.lock().unwrap_or_else(std::sync::PoisonError::into_inner).lots().len()
    }

    fn ledger_for(&self, item: &str, location: &str) -> LedgerSnapshot {
        let key = (item.to_string(), location.to_string());
        self.ledgers.update_or_insert(key.clone(), LedgerSnapshot::default, |_| {});
        self.ledgers.get(&key).unwrap_or_default()
    }

    /// Consumes `qty` at `(item, location)` using `method`. Exposed for
    /// handler-side validation before an issue event is accepted (e.g. to
    /// surface `INSUFFICIENT_STOCK` without first mutating state — callers
    /// that need a dry run should snapshot `stock_on_hand` instead, since
    /// this method does mutate the ledger).
    fn consume(&self, item: &str, location: &str, qty: i64, method: ValuationMethod) -> ConsumptionResult {
        let snapshot = self.ledger_for(item, location);
        let mut ledger = snapshot.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        ledger.consume(qty, method)
    }
}

impl ProjectionStore for InventoryProjection {
    fn apply(&self, event_type: &str, payload: &Payload) {
        match event_type {
            commands::STOCK_RECEIVED_EVENT => {
                let item = str_field(payload, "item");
                let location = str_field(payload, "location");
                let lot_id = str_field(payload, "lot_id");
                let qty = i64_field(payload, "qty");
                let unit_cost = i64_field(payload, "unit_cost");
                let reference = str_field(payload, "reference");
                let received_at = payload
                    .get("issued_at")
                    .and_then(Value::as_str)
                    .and_then(|raw| time::OffsetDateTime::parse(raw, &time::format_description::well_known::Rfc3339).ok())
                    .unwrap_or(time::OffsetDateTime::UNIX_EPOCH);

                let snapshot = self.ledger_for(&item, &location);
                snapshot.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner).receive(lot_id, qty, unit_cost, received_at, reference);
            }
            commands::STOCK_ISSUED_EVENT => {
                let item = str_field(payload, "item");
                let location = str_field(payload, "location");
                let qty = i64_field(payload, "qty");
                let method = method_field(payload, "method");
                let _ = self.consume(&item, &location, qty, method);
            }
            _ => {}
        }
    }
}
