// crates/bos-http/src/lib.rs
// ============================================================================
// Module: BOS HTTP
// Description: Transport-agnostic HTTP context resolution (§4.6).
// Purpose: Turn an inbound request's headers and body into an `ActorContext`
//          plus `BusinessContext` pair the dispatcher can consume, and map a
//          rejection back to a status-code hint, without depending on any
//          concrete HTTP server or client crate.
// Dependencies: bos-core
// ============================================================================

//! ## Overview
//! Every other BOS crate is transport-agnostic by construction; `bos-http`
//! keeps that property by expressing "an inbound request" as two small
//! lookup traits ([`lookup::HeaderLookup`] and [`lookup::BodyLookup`])
//! instead of binding to axum, hyper, or a concrete body type. A real server
//! adapts its own request type to these traits at the edge; this crate never
//! needs to change when the server framework does.

#![forbid(unsafe_code)]

mod lookup;
mod resolver;
mod status;

pub use lookup::BodyLookup;
pub use lookup::HeaderLookup;
pub use resolver::API_KEY_HEADER;
pub use resolver::BRANCH_ID_HEADER;
pub use resolver::BUSINESS_ID_HEADER;
pub use resolver::ResolvedBusinessContext;
pub use resolver::resolve_context;
pub use status::rejection_to_status_hint;
