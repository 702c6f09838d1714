// demos/cash-engine/src/projection.rs
// ============================================================================
// Module: Cash Engine Projection
// Description: The read model this engine folds its own accepted events into.
// Purpose: Implement §4.3 "Projection apply" for cash sessions and drawer
//          balances.
// Dependencies: bos-core, bos-projection, serde_json
// ============================================================================

use bos_core::core::command::Payload;
use bos_projection::ProjectionStore;
use bos_projection::ProjectionTable;
use serde_json::Value;

use crate::commands;

/// Lifecycle state of a cash session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Open and accepting payments.
    Open,
    /// Closed; `closing_balance`/`expected_balance`/`difference` are set.
    Closed,
}

/// A cash session's read-model row.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Drawer this session was opened against.
    pub drawer_id: String,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// Running balance: opening balance plus every recorded payment.
    pub balance: i64,
    /// Caller-reported closing balance, once closed.
    pub closing_balance: Option<i64>,
    /// System-computed expected balance, once closed.
    pub expected_balance: Option<i64>,
    /// `closing_balance - expected_balance`, once closed.
    pub difference: Option<i64>,
}

impl SessionRecord {
    fn opened(drawer_id: String, opening_balance: i64) -> Self {
        Self {
            drawer_id,
            status: SessionStatus::Open,
            balance: opening_balance,
            closing_balance: None,
            expected_balance: None,
            difference: None,
        }
    }
}

/// The cash engine's read model: sessions keyed by session id, and the latest
/// known balance per drawer.
#[derive(Debug, Default)]
pub struct CashProjection {
    sessions: ProjectionTable<String, SessionRecord>,
    drawer_balances: ProjectionTable<String, i64>,
}

impl CashProjection {
    /// Creates an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the session row at `session_id`, if present.
    #[must_use]
    pub fn session(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.get(&session_id.to_string())
    }

    /// Returns the latest known balance for `drawer_id`, if present.
    #[must_use]
    pub fn drawer_balance(&self, drawer_id: &str) -> Option<i64> {
        self.drawer_balances.get(&drawer_id.to_string())
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

impl ProjectionStore for CashProjection {
    fn apply(&self, event_type: &str, payload: &Payload) {
        match event_type {
            commands::SESSION_OPENED_EVENT => {
                let session_id = str_field(payload, "session_id");
                let drawer_id = str_field(payload, "drawer_id");
                let opening_balance = i64_field(payload, "opening_balance");
                self.sessions.set(session_id, SessionRecord::opened(drawer_id.clone(), opening_balance));
                self.drawer_balances.set(drawer_id, opening_balance);
            }
            commands::PAYMENT_RECORDED_EVENT => {
                let session_id = str_field(payload, "session_id");
                let amount = i64_field(payload, "amount");
                let Some(mut session) = self.sessions.get(&session_id) else { return };
                session.balance += amount;
                let drawer_id = session.drawer_id.clone();
                let balance = session.balance;
                self.sessions.set(session_id, session);
                self.drawer_balances.set(drawer_id, balance);
            }
            commands::SESSION_CLOSED_EVENT => {
                let session_id = str_field(payload, "session_id");
                let closing_balance = i64_field(payload, "closing_balance");
                let expected_balance = i64_field(payload, "expected_balance");
                let Some(mut session) = self.sessions.get(&session_id) else { return };
                session.status = SessionStatus::Closed;
                session.closing_balance = Some(closing_balance);
                session.expected_balance = Some(expected_balance);
                session.difference = Some(closing_balance - expected_balance);
                self.sessions.set(session_id, session);
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
    fn full_session_lifecycle_computes_difference() {
        let projection = CashProjection::new();
        projection.apply(
            commands::SESSION_OPENED_EVENT,
            &payload(&[("session_id", json!("S1")), ("drawer_id", json!("D1")), ("opening_balance", json!(50_000))]),
        );
        projection.apply(
            commands::PAYMENT_RECORDED_EVENT,
            &payload(&[("session_id", json!("S1")), ("amount", json!(15_000))]),
        );
        projection.apply(
            commands::SESSION_CLOSED_EVENT,
            &payload(&[("session_id", json!("S1")), ("closing_balance", json!(65_000)), ("expected_balance", json!(65_000))]),
        );

        let session = projection.session("S1").expect("present");
        assert_eq!(session.status, SessionStatus::Closed);
        assert_eq!(session.balance, 65_000);
        assert_eq!(session.difference, Some(0));
        assert_eq!(projection.drawer_balance("D1"), Some(65_000));
    }

    #[test]
    fn payment_against_unknown_session_is_a_no_op() {
        let projection = CashProjection::new();
        projection.apply(commands::PAYMENT_RECORDED_EVENT, &payload(&[("session_id", json!("missing")), ("amount", json!(1))]));
        assert!(projection.session("missing").is_none());
    }
}
