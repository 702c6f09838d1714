// crates/bos-core/src/core/identifiers.rs
// ============================================================================
// Module: BOS Identifiers
// Description: UUID-backed newtype identifiers used across the pipeline.
// Purpose: Prevent accidental mixing of identifier kinds at compile time.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Every identifier in BOS is a UUID wrapped in a distinct newtype so that,
//! for example, a `TenantId` can never be passed where a `BranchId` is
//! expected even though both are backed by the same `Uuid` representation.
//!
//! Invariants:
//! - Values are immutable once constructed.
//! - `Display` renders the canonical hyphenated UUID form.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Declares a UUID-backed newtype identifier with the shared accessor set.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID without generating a new one.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(raw)?))
            }
        }
    };
}

uuid_identifier!(
    /// Identifies a tenant (business) within BOS.
    TenantId
);

uuid_identifier!(
    /// Identifies a branch within a tenant.
    BranchId
);

uuid_identifier!(
    /// Identifies a command.
    CommandId
);

uuid_identifier!(
    /// Identifies an emitted event.
    EventId
);

uuid_identifier!(
    /// Groups all commands and events belonging to the same causal story.
    CorrelationId
);

uuid_identifier!(
    /// Identifies an audit log entry.
    AuditEntryId
);

uuid_identifier!(
    /// Identifies a consent record.
    ConsentId
);

/// Identifies the actor issuing a command.
///
/// # Invariants
/// - Never empty; actors are identified by opaque strings (API keys, device
///   serials, human usernames) rather than UUIDs, since externally-issued
///   actor identifiers are not guaranteed to be UUID-shaped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Creates an actor identifier, rejecting empty strings.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is empty or all whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, ActorIdError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ActorIdError::Empty);
        }
        Ok(Self(raw))
    }

    /// Returns the actor identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Errors constructing an [`ActorId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActorIdError {
    /// The raw actor identifier was empty or whitespace-only.
    #[error("actor id must not be empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_round_trips_through_display_and_parse() {
        let id = TenantId::new();
        let parsed: TenantId = id.to_string().parse().expect("valid uuid text");
        assert_eq!(id, parsed);
    }

    #[test]
    fn distinct_identifier_types_do_not_compare_equal_by_construction() {
        // Compile-time guarantee: TenantId and BranchId are distinct types,
        // so there is no equality operator between them at all.
        let tenant = TenantId::new();
        let branch = BranchId::from_uuid(tenant.as_uuid());
        assert_eq!(tenant.as_uuid(), branch.as_uuid());
    }

    #[test]
    fn actor_id_rejects_empty_and_whitespace() {
        assert!(ActorId::new("").is_err());
        assert!(ActorId::new("   ").is_err());
        assert!(ActorId::new("user-42").is_ok());
    }
}
