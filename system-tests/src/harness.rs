// system-tests/src/harness.rs
// ============================================================================
// Module: Pipeline Harness
// Description: Assembles a `Dispatcher` wired with the three demo engines
//              against a test-controlled `FixedClock` and `InMemoryEventSink`.
// Purpose: Give every scenario/invariant test the same one-call setup,
//          grounded in `bos_cli::wiring::assemble` but substituting a
//          `FixedClock` for `SystemClock` so tests control time explicitly
//          (§5 "Ordering guarantees", §8 properties 3/6).
// Dependencies: accounting-engine, bos-config, bos-core, bos-dispatcher,
//               bos-events, cash-engine, inventory-engine
// ============================================================================

use std::sync::Arc;

use accounting_engine::AccountingEngine;
use bos_config::BosConfig;
use bos_core::core::time::Clock;
use bos_core::core::time::FixedClock;
use bos_dispatcher::Dispatcher;
use bos_events::InMemoryEventSink;
use bos_events::PersistenceSink;
use cash_engine::CashEngine;
use inventory_engine::InventoryEngine;
use time::OffsetDateTime;

/// A fully wired pipeline under test: a [`Dispatcher`] with the cash,
/// inventory, and accounting demo engines registered against their owned
/// intents, backed by a [`FixedClock`] the test advances explicitly and an
/// [`InMemoryEventSink`] a test can inspect after dispatching.
pub struct Harness {
    /// The fixed clock driving every timestamp in the pipeline.
    pub clock: Arc<FixedClock>,
    /// The assembled dispatcher.
    pub dispatcher: Dispatcher,
    /// The in-memory sink every engine persists through.
    pub sink: Arc<InMemoryEventSink>,
    /// The cash engine handler, for projection queries after dispatch.
    pub cash: Arc<CashEngine>,
    /// The inventory engine handler, for projection queries after dispatch.
    pub inventory: Arc<InventoryEngine>,
    /// The accounting engine handler, for projection queries after dispatch.
    pub accounting: Arc<AccountingEngine>,
}

impl Harness {
    /// Assembles a fresh [`Harness`] with `config`, starting the fixed clock
    /// at `start`.
    #[must_use]
    pub fn new(config: BosConfig, start: OffsetDateTime) -> Self {
        let clock = Arc::new(FixedClock::new(start));
        let clock_dyn: Arc<dyn Clock> = clock.clone();
        let sink = Arc::new(InMemoryEventSink::new());
        let persistence: Arc<dyn PersistenceSink> = sink.clone();
        let dispatcher = Dispatcher::new(clock_dyn.clone(), config, persistence.clone());

        let cash = Arc::new(CashEngine::new(clock_dyn.clone(), persistence.clone(), dispatcher.event_registry().clone(), None));
        for intent in cash_engine::commands::owned_command_types() {
            dispatcher.register_handler(intent, cash.clone());
        }

        let inventory = Arc::new(InventoryEngine::new(clock_dyn.clone(), persistence.clone(), dispatcher.event_registry().clone(), None));
        for intent in inventory_engine::commands::owned_command_types() {
            dispatcher.register_handler(intent, inventory.clone());
        }

        let accounting = Arc::new(AccountingEngine::new(clock_dyn, persistence, dispatcher.event_registry().clone(), None));
        for intent in accounting_engine::commands::owned_command_types() {
            dispatcher.register_handler(intent, accounting.clone());
        }

        Self { clock, dispatcher, sink, cash, inventory, accounting }
    }

    /// Assembles a [`Harness`] with [`BosConfig::default`] tiers, starting at
    /// the given instant — the common case for scenario tests that don't
    /// need non-default rate-limit or anomaly thresholds.
    #[must_use]
    pub fn with_defaults(start: OffsetDateTime) -> Self {
        Self::new(BosConfig::default(), start)
    }
}
