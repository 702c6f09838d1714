// crates/bos-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Event Store
// Description: Durable PersistenceSink backed by SQLite WAL, plus replay.
// Purpose: Persist accepted events append-only per tenant and let projection
//          stores rebuild from a replay of that log in append order.
// Dependencies: bos-core, bos-events, rusqlite, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! A single writer connection, guarded by a mutex, serializes every insert;
//! `SQLite`'s WAL mode lets readers (`replay`) proceed without blocking on it.
//! Loads verify nothing beyond what the column types already guarantee —
//! unlike a hash-chained store, this log trusts its own disk file, since its
//! only reader is the projection-rebuild path running against a local file.

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use bos_core::core::command::ActorKind;
use bos_core::core::command::Payload;
use bos_core::core::command::ScopeRequirement;
use bos_core::core::context::BusinessContext;
use bos_core::core::event::EventEnvelope;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::CommandId;
use bos_core::core::identifiers::CorrelationId;
use bos_core::core::identifiers::EventId;
use bos_core::core::identifiers::TenantId;
use bos_events::EventTypeRegistry;
use bos_events::PersistResult;
use bos_events::PersistenceSink;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use thiserror::Error;

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended for a writer + concurrent readers).
    #[default]
    Wal,
    /// Delete journal mode (legacy, simpler on constrained filesystems).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// Configuration for the `SQLite` event store.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds before a lock-contended statement errors.
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    pub journal_mode: SqliteStoreMode,
}

impl SqliteStoreConfig {
    /// Builds a config at `path` with the library defaults (WAL, 5s busy timeout).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout_ms: 5_000, journal_mode: SqliteStoreMode::Wal }
    }
}

/// `SQLite` store errors.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error (cannot open or create the database file).
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A stored row failed to decode back into its typed representation.
    #[error("sqlite store corrupt row: {0}")]
    Corrupt(String),
}

/// One event as read back from the durable log (§4.3 "Persisted state layout").
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedEvent {
    /// The stored event identifier.
    pub event_id: EventId,
    /// The event type, e.g. `cash.session.opened.v1`.
    pub event_type: String,
    /// The structured event payload.
    pub payload: Payload,
    /// The target tenant.
    pub tenant_id: TenantId,
    /// The target branch, if any.
    pub branch_id: Option<BranchId>,
    /// The originating command's correlation id.
    pub correlation_id: CorrelationId,
    /// The originating command's id.
    pub command_id: CommandId,
    /// The originating command's actor id.
    pub actor_id: String,
    /// The originating command's actor kind.
    pub actor_kind: ActorKind,
    /// When the event occurred.
    pub occurred_at: OffsetDateTime,
}

/// `SQLite`-backed, append-only event log.
pub struct SqliteEventStore {
    connection: Mutex<Connection>,
}

impl SqliteEventStore {
    /// Opens (creating if absent) a `SQLite`-backed event store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened,
    /// configured, or migrated to the current schema.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(&config.path)?;
        let connection = Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        connection
            .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection
            .pragma_update(None, "journal_mode", config.journal_mode.pragma_value())
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection.pragma_update(None, "foreign_keys", "on").map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        initialize_schema(&connection)?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    /// Opens an in-memory store, useful for tests that want durability
    /// semantics without a filesystem dependency.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if schema initialization fails.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory().map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        initialize_schema(&connection)?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    /// Verifies the store can execute a trivial statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the connection mutex is poisoned or the
    /// probe statement fails.
    pub fn readiness(&self) -> Result<(), SqliteStoreError> {
        let guard = self.connection.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.execute("SELECT 1", []).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Replays every event stored for `tenant_id`, in append order.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the query fails or a stored row cannot
    /// be decoded.
    pub fn replay(&self, tenant_id: TenantId) -> Result<std::vec::IntoIter<PersistedEvent>, SqliteStoreError> {
        let guard = self.connection.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut statement = guard
            .prepare(
                "SELECT event_id, event_type, payload, tenant_id, branch_id, correlation_id, \
                 command_id, actor_id, actor_kind, occurred_at \
                 FROM events WHERE tenant_id = ?1 ORDER BY seq ASC",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![tenant_id.to_string()], row_to_raw)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut events = Vec::new();
        for row in rows {
            let raw = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            events.push(decode_persisted_event(raw)?);
        }
        Ok(events.into_iter())
    }

    fn insert_event(&self, event: &EventEnvelope) -> Result<(), SqliteStoreError> {
        let payload_json =
            serde_json::to_string(event.payload()).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?;
        let occurred_at = event
            .occurred_at()
            .format(&Rfc3339)
            .map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?;
        let guard = self.connection.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .execute(
                "INSERT INTO events (event_id, event_type, payload, tenant_id, branch_id, \
                 correlation_id, command_id, actor_id, actor_kind, occurred_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    event.event_id().to_string(),
                    event.event_type(),
                    payload_json,
                    event.tenant_id().to_string(),
                    event.branch_id().map(|branch_id| branch_id.to_string()),
                    event.correlation_id().to_string(),
                    event.command_id().to_string(),
                    event.actor_id(),
                    actor_kind_to_str(event.actor_kind()),
                    occurred_at,
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }
}

impl PersistenceSink for SqliteEventStore {
    fn persist(
        &self,
        event: &EventEnvelope,
        _context: &dyn BusinessContext,
        registry: &EventTypeRegistry,
        scope_requirement: ScopeRequirement,
    ) -> PersistResult {
        if !registry.contains(event.event_type()) {
            return PersistResult { accepted: false };
        }
        if matches!(scope_requirement, ScopeRequirement::BranchRequired) && event.branch_id().is_none() {
            return PersistResult { accepted: false };
        }
        match self.insert_event(event) {
            Ok(()) => PersistResult { accepted: true },
            Err(_) => PersistResult { accepted: false },
        }
    }
}

struct RawEventRow {
    event_id: String,
    event_type: String,
    payload: String,
    tenant_id: String,
    branch_id: Option<String>,
    correlation_id: String,
    command_id: String,
    actor_id: String,
    actor_kind: String,
    occurred_at: String,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEventRow> {
    Ok(RawEventRow {
        event_id: row.get(0)?,
        event_type: row.get(1)?,
        payload: row.get(2)?,
        tenant_id: row.get(3)?,
        branch_id: row.get(4)?,
        correlation_id: row.get(5)?,
        command_id: row.get(6)?,
        actor_id: row.get(7)?,
        actor_kind: row.get(8)?,
        occurred_at: row.get(9)?,
    })
}

fn decode_persisted_event(raw: RawEventRow) -> Result<PersistedEvent, SqliteStoreError> {
    Ok(PersistedEvent {
        event_id: EventId::from_str(&raw.event_id).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?,
        event_type: raw.event_type,
        payload: serde_json::from_str(&raw.payload).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?,
        tenant_id: TenantId::from_str(&raw.tenant_id).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?,
        branch_id: raw
            .branch_id
            .map(|value| BranchId::from_str(&value).map_err(|err| SqliteStoreError::Corrupt(err.to_string())))
            .transpose()?,
        correlation_id: CorrelationId::from_str(&raw.correlation_id)
            .map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?,
        command_id: CommandId::from_str(&raw.command_id).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?,
        actor_id: raw.actor_id,
        actor_kind: actor_kind_from_str(&raw.actor_kind)?,
        occurred_at: OffsetDateTime::parse(&raw.occurred_at, &Rfc3339)
            .map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?,
    })
}

const fn actor_kind_to_str(kind: ActorKind) -> &'static str {
    match kind {
        ActorKind::Human => "human",
        ActorKind::System => "system",
        ActorKind::Device => "device",
        ActorKind::Ai => "ai",
    }
}

fn actor_kind_from_str(raw: &str) -> Result<ActorKind, SqliteStoreError> {
    match raw {
        "human" => Ok(ActorKind::Human),
        "system" => Ok(ActorKind::System),
        "device" => Ok(ActorKind::Device),
        "ai" => Ok(ActorKind::Ai),
        other => Err(SqliteStoreError::Corrupt(format!("unknown actor_kind `{other}`"))),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    }
    Ok(())
}

fn initialize_schema(connection: &Connection) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id TEXT NOT NULL UNIQUE,
                event_type TEXT NOT NULL,
                payload TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                branch_id TEXT,
                correlation_id TEXT NOT NULL,
                command_id TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                actor_kind TEXT NOT NULL,
                occurred_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_tenant_seq ON events(tenant_id, seq);",
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Looks up an event by id, used only by tests to assert exact persistence.
#[cfg(test)]
fn find_by_event_id(connection: &Connection, event_id: EventId) -> rusqlite::Result<Option<String>> {
    connection
        .query_row("SELECT event_type FROM events WHERE event_id = ?1", params![event_id.to_string()], |row| {
            row.get(0)
        })
        .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bos_core::core::command::ActorKind;
    use bos_core::core::context::BusinessLifecycle;
    use bos_core::core::event::EventEnvelopeSpec;
    use bos_core::core::identifiers::BranchId;
    use serde_json::Map;
    use time::macros::datetime;

    struct NullContext;
    impl BusinessContext for NullContext {
        fn has_active_context(&self) -> bool {
            true
        }
        fn active_business_id(&self) -> Option<TenantId> {
            None
        }
        fn lifecycle(&self) -> BusinessLifecycle {
            BusinessLifecycle::Active
        }
        fn is_branch_in_business(&self, _branch_id: BranchId) -> bool {
            true
        }
    }

    fn sample_event(tenant_id: TenantId, event_type: &str, branch_id: Option<BranchId>) -> EventEnvelope {
        EventEnvelope::new(EventEnvelopeSpec {
            event_type: event_type.to_string(),
            payload: Map::new(),
            tenant_id,
            branch_id,
            correlation_id: CorrelationId::new(),
            command_id: CommandId::new(),
            actor_id: "user-1".to_string(),
            actor_kind: ActorKind::Human,
            occurred_at: datetime!(2026-01-01 00:00:00 UTC),
        })
    }

    #[test]
    fn persists_and_replays_in_append_order() {
        let store = SqliteEventStore::open_in_memory().expect("open");
        let registry = EventTypeRegistry::new();
        registry.register("cash.session.opened.v1");
        let tenant_id = TenantId::new();

        let first = sample_event(tenant_id, "cash.session.opened.v1", None);
        let second = sample_event(tenant_id, "cash.session.opened.v1", None);
        assert!(store.persist(&first, &NullContext, &registry, ScopeRequirement::BusinessAllowed).accepted);
        assert!(store.persist(&second, &NullContext, &registry, ScopeRequirement::BusinessAllowed).accepted);

        let replayed: Vec<PersistedEvent> = store.replay(tenant_id).expect("replay").collect();
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].event_id, first.event_id());
        assert_eq!(replayed[1].event_id, second.event_id());
    }

    #[test]
    fn rejects_event_type_absent_from_registry() {
        let store = SqliteEventStore::open_in_memory().expect("open");
        let registry = EventTypeRegistry::new();
        let event = sample_event(TenantId::new(), "cash.session.opened.v1", None);
        let result = store.persist(&event, &NullContext, &registry, ScopeRequirement::BusinessAllowed);
        assert!(!result.accepted);
        let guard = store.connection.lock().expect("lock");
        assert!(find_by_event_id(&guard, event.event_id()).expect("query").is_none());
    }

    #[test]
    fn rejects_branch_required_event_missing_branch_id() {
        let store = SqliteEventStore::open_in_memory().expect("open");
        let registry = EventTypeRegistry::new();
        registry.register("inventory.stock.received.v1");
        let event = sample_event(TenantId::new(), "inventory.stock.received.v1", None);
        let result = store.persist(&event, &NullContext, &registry, ScopeRequirement::BranchRequired);
        assert!(!result.accepted);
    }

    #[test]
    fn replay_is_scoped_to_its_tenant() {
        let store = SqliteEventStore::open_in_memory().expect("open");
        let registry = EventTypeRegistry::new();
        registry.register("cash.session.opened.v1");
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        store.persist(&sample_event(tenant_a, "cash.session.opened.v1", None), &NullContext, &registry, ScopeRequirement::BusinessAllowed);
        store.persist(&sample_event(tenant_b, "cash.session.opened.v1", None), &NullContext, &registry, ScopeRequirement::BusinessAllowed);

        let replayed: Vec<PersistedEvent> = store.replay(tenant_a).expect("replay").collect();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].tenant_id, tenant_a);
    }
}
