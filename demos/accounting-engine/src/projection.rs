// demos/accounting-engine/src/projection.rs
// ============================================================================
// Module: Accounting Engine Projection
// Description: The read model this engine folds its own accepted events into.
// Purpose: Implement §4.3 "Projection apply" over account balances keyed by
//          account code and an obligations ledger keyed by obligation id.
// Dependencies: bos-core, bos-projection, serde_json
// ============================================================================

use bos_core::core::command::Payload;
use bos_projection::ProjectionStore;
use bos_projection::ProjectionTable;
use serde_json::Value;

use crate::commands;

/// One obligation's read-model row.
#[derive(Debug, Clone, Copy)]
pub struct ObligationRecord {
    /// Total amount owed, in minor currency units.
    pub total_amount: i64,
    /// Amount fulfilled so far.
    pub fulfilled_amount: i64,
}

impl ObligationRecord {
    /// Returns the amount still owed.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.total_amount - self.fulfilled_amount
    }
}

/// Reads a string field from `payload`, or `""` if absent or the wrong type.
fn str_field(payload: &Payload, field: &str) -> String {
    payload.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Reads an integer field from `payload`, or `0` if absent or the wrong type.
fn i64_field(payload: &Payload, field: &str) -> i64 {
    payload.get(field).and_then(Value::as_i64).unwrap_or_default()
}

/// The accounting engine's read model: account balances (net debit minus
/// credit) keyed by account code, and obligations keyed by obligation id.
#[derive(Debug, Default)]
pub struct AccountingProjection {
    account_balances: ProjectionTable<String, i64>,
    obligations: ProjectionTable<String, ObligationRecord>,
}

impl AccountingProjection {
    /// Creates an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the net balance (`Σ debit - Σ credit`) posted to `account`, or
    /// `0` when nothing has ever posted to it.
    #[must_use]
    pub fn account_balance(&self, account: &str) -> i64 {
        self.account_balances.get(&account.to_string()).unwrap_or(0)
    }

    /// Returns the sum of every account balance. Because every posted entry
    /// is balanced (`Σ debits = Σ credits`, §8 property 13), this is always
    /// zero across a stream of only-accepted postings.
    #[must_use]
    pub fn trial_balance(&self) -> i64 {
        self.account_balances.snapshot().iter().map(|(_, balance)| *balance).sum()
    }

    /// Returns a clone of the obligation row at `obligation_id`, if present.
    #[must_use]
    pub fn obligation(&self, obligation_id: &str) -> Option<ObligationRecord> {
        self.obligations.get(&obligation_id.to_string())
    }
}

impl ProjectionStore for AccountingProjection {
    fn apply(&self, event_type: &str, payload: &Payload) {
        match event_type {
            commands::JOURNAL_POSTED_EVENT => {
                let Some(lines) = payload.get("lines").and_then(Value::as_array) else { return };
                for line in lines {
                    let Some(object) = line.as_object() else { continue };
                    let account = object.get("account").and_then(Value::as_str).unwrap_or_default().to_string();
                    let debit = object.get("debit").and_then(Value::as_i64).unwrap_or_default();
                    let credit = object.get("credit").and_then(Value::as_i64).unwrap_or_default();
                    self.account_balances.update_or_insert(account, || 0, |balance| *balance += debit - credit);
                }
            }
            commands::OBLIGATION_RECORDED_EVENT => {
                let obligation_id = str_field(payload, "obligation_id");
                let amount = i64_field(payload, "amount");
                self.obligations.set(obligation_id, ObligationRecord { total_amount: amount, fulfilled_amount: 0 });
            }
            commands::OBLIGATION_FULFILLED_EVENT => {
                let obligation_id = str_field(payload, "obligation_id");
                let amount = i64_field(payload, "amount");
                let Some(mut record) = self.obligations.get(&obligation_id) else { return };
                record.fulfilled_amount += amount;
                self.obligations.set(obligation_id, record);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;
    use serde_json::json;

    use super::*;

    fn payload(pairs: &[(&str, Value)]) -> Payload {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert((*key).to_string(), value.clone());
        }
        map
    }

    #[test]
    fn balanced_entry_leaves_trial_balance_at_zero() {
        let projection = AccountingProjection::new();
        projection.apply(
            commands::JOURNAL_POSTED_EVENT,
            &payload(&[
                ("entry_id", json!("E1")),
                ("lines", json!([{"account": "A", "debit": 1000, "credit": 0}, {"account": "B", "debit": 0, "credit": 1000}])),
            ]),
        );
        assert_eq!(projection.account_balance("A"), 1000);
        assert_eq!(projection.account_balance("B"), -1000);
        assert_eq!(projection.trial_balance(), 0);
    }

    #[test]
    fn obligation_fulfilment_reduces_remaining() {
        let projection = AccountingProjection::new();
        projection.apply(commands::OBLIGATION_RECORDED_EVENT, &payload(&[("obligation_id", json!("OB1")), ("amount", json!(500))]));
        projection.apply(commands::OBLIGATION_FULFILLED_EVENT, &payload(&[("obligation_id", json!("OB1")), ("amount", json!(200))]));

        let record = projection.obligation("OB1").expect("present");
        assert_eq!(record.remaining(), 300);
    }
}
