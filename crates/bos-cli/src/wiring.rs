// crates/bos-cli/src/wiring.rs
// ============================================================================
// Module: BOS CLI Engine Wiring
// Description: Builds a single in-memory `Dispatcher` with the three demo
//              engines registered against it.
// Purpose: Give the CLI one place to wire up the pipeline for local
//          exploration, mirroring how a real host would assemble a
//          `Dispatcher` at startup (§4.1, §4.4 item 5).
// Dependencies: accounting-engine, bos-config, bos-core, bos-dispatcher,
//               bos-events, cash-engine, inventory-engine
// ============================================================================

use std::sync::Arc;

use accounting_engine::AccountingEngine;
use bos_config::BosConfig;
use bos_core::core::time::Clock;
use bos_core::core::time::SystemClock;
use bos_dispatcher::Dispatcher;
use bos_events::InMemoryEventSink;
use bos_events::PersistenceSink;
use cash_engine::CashEngine;
use inventory_engine::InventoryEngine;

/// Everything a CLI command needs to dispatch against: the dispatcher itself
/// and the in-memory sink it persists accepted events to, so a caller can
/// inspect what was written after the fact.
pub struct Pipeline {
    /// The assembled dispatcher, with every demo engine's intents registered.
    pub dispatcher: Dispatcher,
    /// The in-memory sink backing every engine's persistence.
    pub sink: Arc<InMemoryEventSink>,
}

/// Assembles a fresh [`Pipeline`]: a wall-clock `Dispatcher` loaded from
/// `config`, with the cash, inventory, and accounting demo engines
/// registered against their owned intents.
#[must_use]
pub fn assemble(config: BosConfig) -> Pipeline {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sink: Arc<InMemoryEventSink> = Arc::new(InMemoryEventSink::new());
    let persistence: Arc<dyn PersistenceSink> = sink.clone();
    let dispatcher = Dispatcher::new(clock.clone(), config, persistence.clone());

    let cash = Arc::new(CashEngine::new(clock.clone(), persistence.clone(), dispatcher.event_registry().clone(), None));
    for intent in cash_engine::commands::owned_command_types() {
        dispatcher.register_handler(intent, cash.clone());
    }

    let inventory = Arc::new(InventoryEngine::new(clock.clone(), persistence.clone(), dispatcher.event_registry().clone(), None));
    for intent in inventory_engine::commands::owned_command_types() {
        dispatcher.register_handler(intent, inventory.clone());
    }

    let accounting = Arc::new(AccountingEngine::new(clock, persistence, dispatcher.event_registry().clone(), None));
    for intent in accounting_engine::commands::owned_command_types() {
        dispatcher.register_handler(intent, accounting.clone());
    }

    Pipeline { dispatcher, sink }
}
