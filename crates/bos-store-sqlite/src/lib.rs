// crates/bos-store-sqlite/src/lib.rs
// ============================================================================
// Module: BOS SQLite Store
// Description: Durable, append-only event log backed by SQLite, implementing
//              `PersistenceSink` plus a per-tenant replay iterator.
// Purpose: Implement §4.3's one concrete durable reference sink ("Persisted
//          state layout") and the replay path projection stores rebuild from.
// Dependencies: bos-core, bos-events, rusqlite
// ============================================================================

//! ## Overview
//! Every event is stored as a row carrying exactly the fields §4.3 names:
//! `event_id`, `tenant_id`, `branch_id`, `event_type`, `payload`,
//! `correlation_id`, `command_id`, `actor_id`, `actor_type`, `occurred_at`,
//! plus a monotonic `seq` column that fixes append order within a tenant.
//! `persist` never returns an error — a write failure is reported as
//! `PersistResult { accepted: false }`, matching the sink contract's
//! `PersistenceSink` trait, which has no error channel of its own.

#![forbid(unsafe_code)]

mod store;

pub use store::PersistedEvent;
pub use store::SqliteEventStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
