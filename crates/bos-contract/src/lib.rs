// crates/bos-contract/src/lib.rs
// ============================================================================
// Module: BOS Contract
// Description: The Engine Contract conformance harness (§4.4).
// Purpose: Mechanically verify that a candidate engine's five artefacts —
//          command types, event types, payload builders, projection store,
//          and service — are internally consistent before it is wired onto
//          a dispatcher.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! `bos-contract` never imports an engine crate and an engine never imports
//! it to satisfy the contract — [`EngineManifest`] is built from plain
//! strings, so the harness has no compile-time dependency edge to any
//! engine's Rust types. Any SaaS-administrative engine (plans, subscriptions,
//! branding) that reuses the pipeline would satisfy the same five-artefact
//! contract as `demos/cash-engine`; this crate does not implement such
//! engines, only the contract they would conform to.

#![forbid(unsafe_code)]

mod manifest;

pub use manifest::ConformanceError;
pub use manifest::EngineManifest;
pub use manifest::check_conformance;
