// crates/bos-core/src/interfaces/mod.rs
// ============================================================================
// Module: BOS Interfaces
// Description: Backend-agnostic provider traits consumed by the guard stack.
// Purpose: Define the contract surfaces through which governance data
//          (permissions, feature flags, compliance rules, document templates,
//          authentication principals) reaches the pipeline without the
//          pipeline depending on any concrete backend.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Every provider here is a pure read interface: no method may have a side
//! effect observable outside of returning its result. Each trait ships
//! exactly one in-memory reference implementation in `bos-providers`, and
//! `AuthProvider` additionally ships one HTTP-backed implementation — the
//! "in-memory, real" two-implementation pattern.
//!
//! Security posture: provider outputs are feed into policy decisions that
//! gate state mutation; a provider-side bug here degrades the entire
//! governance layer, not just itself.

pub mod providers;
