// crates/bos-contract/src/manifest.rs
// ============================================================================
// Module: Engine Manifest & Conformance Checks
// Description: Plain-data description of an engine's five artefacts, plus
//              the mechanical consistency checks run against it.
// Purpose: Implement §4.4 "Engine Contract" — verify that a candidate
//          engine's command types, event types, payload builders, and
//          subscriptions are internally consistent, without the harness
//          ever depending on the engine's own Rust types.
// Dependencies: std::collections, thiserror
// ============================================================================

//! ## Overview
//! An [`EngineManifest`] is a description, not a dependency: it is built from
//! plain `String`s an engine hands the harness at startup (or in a test), so
//! the harness never imports an engine crate and an engine never imports a
//! sibling engine's crate to satisfy it. [`check_conformance`] walks the
//! manifest once and reports every inconsistency it finds rather than
//! stopping at the first one, since a wiring defect in one artefact rarely
//! explains the whole picture.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Plain-data description of one engine's five contract artefacts (§4.4).
///
/// # Invariants
/// - Every field is a set or map of `String`s — the harness never accepts a
///   foreign engine's Rust type, which is what keeps the conformance check
///   itself free of any compile-time dependency edge between engines.
#[derive(Debug, Clone, Default)]
pub struct EngineManifest {
    /// The engine's own name, used only in error messages.
    pub engine_name: String,
    /// The closed set of command types (intents) this engine owns.
    pub command_types: BTreeSet<String>,
    /// The closed set of event types this engine declares at startup.
    pub event_types: BTreeSet<String>,
    /// Maps each owned command type to the event type its payload builder
    /// resolves to on acceptance.
    pub builder_event_types: BTreeMap<String, String>,
    /// Foreign event types this engine subscribes to, by name only.
    pub subscriptions: BTreeSet<String>,
}

impl EngineManifest {
    /// Creates an empty manifest for `engine_name`.
    #[must_use]
    pub fn new(engine_name: impl Into<String>) -> Self {
        Self {
            engine_name: engine_name.into(),
            ..Self::default()
        }
    }

    /// Declares `command_type` as owned by this engine.
    #[must_use]
    pub fn with_command_type(mut self, command_type: impl Into<String>) -> Self {
        self.command_types.insert(command_type.into());
        self
    }

    /// Declares `event_type` as registered by this engine.
    #[must_use]
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types.insert(event_type.into());
        self
    }

    /// Declares the payload builder owned by `command_type` resolves to
    /// `event_type` on acceptance.
    #[must_use]
    pub fn with_builder(mut self, command_type: impl Into<String>, event_type: impl Into<String>) -> Self {
        self.builder_event_types.insert(command_type.into(), event_type.into());
        self
    }

    /// Declares a subscription to `foreign_event_type`.
    #[must_use]
    pub fn with_subscription(mut self, foreign_event_type: impl Into<String>) -> Self {
        self.subscriptions.insert(foreign_event_type.into());
        self
    }
}

/// One conformance defect found in an [`EngineManifest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConformanceError {
    /// An owned command type has no payload builder entry.
    #[error("engine `{engine}` owns command type `{command_type}` with no payload builder")]
    MissingPayloadBuilder {
        /// The engine reporting the defect.
        engine: String,
        /// The command type with no builder.
        command_type: String,
    },
    /// A payload builder resolves to an event type the engine never registered.
    #[error("engine `{engine}`'s builder for `{command_type}` resolves to unregistered event type `{event_type}`")]
    UnregisteredEventType {
        /// The engine reporting the defect.
        engine: String,
        /// The command type whose builder is inconsistent.
        command_type: String,
        /// The unregistered event type the builder resolves to.
        event_type: String,
    },
    /// A subscription names one of the engine's own event types rather than
    /// a foreign one.
    #[error("engine `{engine}` subscribes to `{event_type}`, which it owns itself")]
    SubscriptionNamesOwnEvent {
        /// The engine reporting the defect.
        engine: String,
        /// The self-owned event type named in the subscription.
        event_type: String,
    },
}

/// Mechanically checks that `manifest`'s five artefacts are internally
/// consistent (§4.4):
/// - every owned command type has a payload builder entry;
/// - every builder's resolved event type is a member of the engine's own
///   registered event-type set;
/// - every subscription names a foreign event type, never one the engine
///   itself registers.
///
/// Collects every defect found rather than stopping at the first, since
/// wiring defects in one artefact rarely explain the whole picture.
///
/// # Errors
///
/// Returns every [`ConformanceError`] found, in a stable order. Returns
/// `Ok(())` when the manifest is fully consistent.
pub fn check_conformance(manifest: &EngineManifest) -> Result<(), Vec<ConformanceError>> {
    let mut errors = Vec::new();

    for command_type in &manifest.command_types {
        let Some(event_type) = manifest.builder_event_types.get(command_type) else {
            errors.push(ConformanceError::MissingPayloadBuilder {
                engine: manifest.engine_name.clone(),
                command_type: command_type.clone(),
            });
            continue;
        };
        if !manifest.event_types.contains(event_type) {
            errors.push(ConformanceError::UnregisteredEventType {
                engine: manifest.engine_name.clone(),
                command_type: command_type.clone(),
                event_type: event_type.clone(),
            });
        }
    }

    for subscribed in &manifest.subscriptions {
        if manifest.event_types.contains(subscribed) {
            errors.push(ConformanceError::SubscriptionNamesOwnEvent {
                engine: manifest.engine_name.clone(),
                event_type: subscribed.clone(),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
