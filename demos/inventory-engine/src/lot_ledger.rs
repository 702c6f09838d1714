// demos/inventory-engine/src/lot_ledger.rs
// ============================================================================
// Module: Inventory Lot Ledger
// Description: Per-(item, location) ordered lot sequence with FIFO/LIFO/WAC
//              consumption (§3 "Lot ledger").
// Purpose: Give the inventory projection a valuation-aware draw-down model
//          deep enough to exercise scenario S2 and §8 property 12.
// Dependencies: serde_json (via crate::projection), time
// ============================================================================

//! ## Overview
//! A [`LotLedger`] holds every lot ever received at a `(item, location)`, in
//! receipt order. Exhausted lots are never removed — they stay for audit —
//! but [`LotLedger::consume`] skips them. FIFO draws oldest-first, LIFO
//! newest-first; WAC draws FIFO-ordered but prices every unit at the
//! ledger's current weighted-average unit cost rather than each lot's own
//! cost, per §3.

use time::OffsetDateTime;

/// Valuation method applied when consuming stock from a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuationMethod {
    /// Consume oldest lots first, at each lot's own unit cost.
    Fifo,
    /// Consume newest lots first, at each lot's own unit cost.
    Lifo,
    /// Consume FIFO-ordered, priced at the ledger's weighted-average cost.
    Wac,
}

/// One received lot. `remaining_qty` is drawn down by consumption;
/// `original_qty` never changes, preserving the audit trail.
#[derive(Debug, Clone)]
pub struct Lot {
    /// Identifier assigned at receipt.
    pub lot_id: String,
    /// Quantity originally received into this lot.
    pub original_qty: i64,
    /// Quantity not yet consumed.
    pub remaining_qty: i64,
    /// Per-unit cost, in minor currency units, at receipt.
    pub unit_cost: i64,
    /// When this lot was received.
    pub received_at: OffsetDateTime,
    /// Caller-supplied reference (e.g. a purchase order number).
    pub reference: String,
}

/// One lot's contribution to a [`ConsumptionResult`].
#[derive(Debug, Clone)]
pub struct LotDraw {
    /// The lot drawn from.
    pub lot_id: String,
    /// Quantity drawn from this lot.
    pub quantity_consumed: i64,
    /// Unit cost applied to this draw (the lot's own cost for FIFO/LIFO, the
    /// ledger's weighted-average cost at draw time for WAC).
    pub unit_cost: i64,
}

/// The result of one [`LotLedger::consume`] call (§3 "Consumption returns").
#[derive(Debug, Clone)]
pub struct ConsumptionResult {
    /// Per-lot draws, in the order they were taken.
    pub lots_drawn: Vec<LotDraw>,
    /// `min(requested_qty, qty available at call time)`.
    pub qty_fulfilled: i64,
    /// `requested_qty - qty_fulfilled`; reported, never silently clipped.
    pub qty_unfulfilled: i64,
    /// Sum of `quantity_consumed * unit_cost` across every draw.
    pub total_cost: i64,
    /// The method applied to this consumption.
    pub method: ValuationMethod,
}

/// An ordered sequence of lots for one `(item, location)` pair.
#[derive(Debug, Clone, Default)]
pub struct LotLedger {
    lots: Vec<Lot>,
}

impl LotLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self { lots: Vec::new() }
    }

    /// Appends a newly received lot.
    pub fn receive(&mut self, lot_id: String, qty: i64, unit_cost: i64, received_at: OffsetDateTime, reference: String) {
        self.lots.push(Lot { lot_id, original_qty: qty, remaining_qty: qty, unit_cost, received_at, reference });
    }

    /// Total remaining quantity across every lot, exhausted or not.
    #[must_use]
    pub fn total_remaining(&self) -> i64 {
        self.lots.iter().map(|lot| lot.remaining_qty).sum()
    }

    /// Total stock value: `Σ remaining_qty · unit_cost` over every lot
    /// (§8 property 12).
    #[must_use]
    pub fn total_value(&self) -> i64 {
        self.lots.iter().map(|lot| lot.remaining_qty * lot.unit_cost).sum()
    }

    /// The weighted-average unit cost over remaining stock, or `0` when the
    /// ledger holds no remaining stock.
    #[must_use]
    pub fn weighted_average_unit_cost(&self) -> i64 {
        let remaining = self.total_remaining();
        if remaining == 0 { 0 } else { self.total_value() / remaining }
    }

    /// Returns every lot, exhausted or not, in receipt order — retained for
    /// audit per §3.
    #[must_use]
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    /// Consumes up to `qty` units using `method`, skipping exhausted lots.
    ///
    /// Partial fulfilment is reported via `qty_unfulfilled`, never silently
    /// clipped (§3, §8 property 12): `qty_consumed = min(qty, total_remaining)`.
    pub fn consume(&mut self, qty: i64, method: ValuationMethod) -> ConsumptionResult {
        let wac = self.weighted_average_unit_cost();
        let mut order: Vec<usize> = (0..self.lots.len()).collect();
        match method {
            ValuationMethod::Fifo | ValuationMethod::Wac => {
                order.sort_by_key(|&i| self.lots[i].received_at);
            }
            ValuationMethod::Lifo => {
                order.sort_by_key(|&i| std::cmp::Reverse(self.lots[i].received_at));
            }
        }

        let mut remaining_to_draw = qty;
        let mut lots_drawn = Vec::new();
        let mut total_cost: i64 = 0;

        for index in order {
            if remaining_to_draw <= 0 {
                break;
            }
            let lot = &mut self.lots[index];
            if lot.remaining_qty <= 0 {
                continue;
            }
            let draw = remaining_to_draw.min(lot.remaining_qty);
            lot.remaining_qty -= draw;
            let unit_cost = if matches!(method, ValuationMethod::Wac) { wac } else { lot.unit_cost };
            total_cost += draw * unit_cost;
            lots_drawn.push(LotDraw { lot_id: lot.lot_id.clone(), quantity_consumed: draw, unit_cost });
            remaining_to_draw -= draw;
        }

        let qty_fulfilled = qty - remaining_to_draw;
        ConsumptionResult { lots_drawn, qty_fulfilled, qty_unfulfilled: remaining_to_draw, total_cost, method }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(seconds)
    }

    #[test]
    fn fifo_consumption_spans_two_lots_matching_scenario_s2() {
        let mut ledger = LotLedger::new();
        ledger.receive("lot-1".to_string(), 20, 1000, at(0), "PO-1".to_string());
        ledger.receive("lot-2".to_string(), 30, 1500, at(1), "PO-2".to_string());

        let result = ledger.consume(35, ValuationMethod::Fifo);

        assert_eq!(result.qty_fulfilled, 35);
        assert_eq!(result.qty_unfulfilled, 0);
        assert_eq!(result.total_cost, 20 * 1000 + 15 * 1500);
        assert_eq!(result.lots_drawn.len(), 2);
        assert_eq!(result.lots_drawn[0].quantity_consumed, 20);
        assert_eq!(result.lots_drawn[1].quantity_consumed, 15);
        assert_eq!(ledger.total_remaining(), 15);
        assert_eq!(ledger.total_value(), 15 * 1500);
    }

    #[test]
    fn lifo_consumption_draws_newest_lot_first() {
        let mut ledger = LotLedger::new();
        ledger.receive("lot-1".to_string(), 20, 1000, at(0), "PO-1".to_string());
        ledger.receive("lot-2".to_string(), 30, 1500, at(1), "PO-2".to_string());

        let result = ledger.consume(10, ValuationMethod::Lifo);

        assert_eq!(result.lots_drawn.len(), 1);
        assert_eq!(result.lots_drawn[0].lot_id, "lot-2");
        assert_eq!(result.total_cost, 10 * 1500);
    }

    #[test]
    fn wac_consumption_prices_every_draw_at_the_ledger_average() {
        let mut ledger = LotLedger::new();
        ledger.receive("lot-1".to_string(), 20, 1000, at(0), "PO-1".to_string());
        ledger.receive("lot-2".to_string(), 30, 1500, at(1), "PO-2".to_string());
        // average = (20*1000 + 30*1500) / 50 = (20000+45000)/50 = 1300
        let result = ledger.consume(25, ValuationMethod::Wac);

        assert_eq!(result.lots_drawn[0].unit_cost, 1300);
        assert_eq!(result.total_cost, 25 * 1300);
    }

    #[test]
    fn partial_fulfilment_is_reported_not_clipped() {
        let mut ledger = LotLedger::new();
        ledger.receive("lot-1".to_string(), 10, 100, at(0), "PO-1".to_string());

        let result = ledger.consume(15, ValuationMethod::Fifo);

        assert_eq!(result.qty_fulfilled, 10);
        assert_eq!(result.qty_unfulfilled, 5);
        assert_eq!(result.total_cost, 10 * 100);
    }

    #[test]
    fn exhausted_lots_are_retained_and_skipped() {
        let mut ledger = LotLedger::new();
        ledger.receive("lot-1".to_string(), 5, 100, at(0), "PO-1".to_string());
        ledger.receive("lot-2".to_string(), 5, 200, at(1), "PO-2".to_string());

        let _ = ledger.consume(5, ValuationMethod::Fifo);
        assert_eq!(ledger.lots().len(), 2);
        assert_eq!(ledger.lots()[0].remaining_qty, 0);

        let second = ledger.consume(5, ValuationMethod::Fifo);
        assert_eq!(second.lots_drawn[0].lot_id, "lot-2");
    }
}
