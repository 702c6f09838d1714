// crates/bos-events/src/registry.rs
// ============================================================================
// Module: BOS Event Type Registry
// Description: The declared, closed set of valid event types.
// Purpose: Implement §2 "Event Type Registry": engines register their event
//          types at startup; envelope emission verifies membership (§4.3).
// Dependencies: std::collections, std::sync
// ============================================================================

//! ## Overview
//! The registry is the authority for *event-type validity*, not the
//! projection — an unknown `event_type` reaching a projection is a silent
//! no-op (§4.3 "Projection apply", property "Total"), but reaching the
//! persistence sink it is a hard rejection via [`EventTypeRegistry::contains`].

use std::collections::BTreeSet;
use std::sync::RwLock;

/// Declared set of valid event types, populated by engines at startup.
#[derive(Debug, Default)]
pub struct EventTypeRegistry {
    event_types: RwLock<BTreeSet<String>>,
}

impl EventTypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `event_type`. Idempotent: registering twice is a no-op.
    pub fn register(&self, event_type: impl Into<String>) {
        self.event_types
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(event_type.into());
    }

    /// Registers every event type in `event_types`.
    pub fn register_all<I, S>(&self, event_types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for event_type in event_types {
            self.register(event_type);
        }
    }

    /// Returns whether `event_type` has been registered.
    #[must_use]
    pub fn contains(&self, event_type: &str) -> bool {
        self.event_types.read().unwrap_or_else(std::sync::PoisonError::into_inner).contains(event_type)
    }

    /// Returns every registered event type, in sorted order.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        self.event_types.read().unwrap_or_else(std::sync::PoisonError::into_inner).iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_event_type_is_absent() {
        let registry = EventTypeRegistry::new();
        assert!(!registry.contains("cash.session.opened.v1"));
    }

    #[test]
    fn registering_is_idempotent() {
        let registry = EventTypeRegistry::new();
        registry.register("cash.session.opened.v1");
        registry.register("cash.session.opened.v1");
        assert_eq!(registry.all(), vec!["cash.session.opened.v1".to_string()]);
    }

    #[test]
    fn register_all_adds_every_entry() {
        let registry = EventTypeRegistry::new();
        registry.register_all(["cash.session.opened.v1", "cash.payment.recorded.v1"]);
        assert!(registry.contains("cash.session.opened.v1"));
        assert!(registry.contains("cash.payment.recorded.v1"));
    }
}
