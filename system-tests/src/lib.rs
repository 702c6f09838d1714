// system-tests/src/lib.rs
// ============================================================================
// Module: BOS System Test Harness
// Description: Shared scaffolding for integration-style tests that drive the
//              full Command-to-Event Governance Pipeline — dispatcher, guard
//              stack, and the three demo engines — end to end.
// Purpose: Give every `tests/*.rs` file one place to assemble a `Dispatcher`
//          against a fixed clock and a configurable `BusinessContext`,
//          mirroring `bos-cli`'s `wiring`/`context` modules but parametrized
//          for tests rather than hardwired to the system clock and a single
//          CLI-exploration permission.
// Dependencies: accounting-engine, bos-config, bos-core, bos-dispatcher,
//               bos-events, bos-providers, cash-engine, inventory-engine
// ============================================================================

//! ## Overview
//! [`Harness`] owns a [`FixedClock`] the test advances explicitly, a fully
//! wired [`Dispatcher`], and handles to each demo engine so a test can query
//! its projection after dispatching. [`TestContext`] is a [`BusinessContext`]
//! a test configures field by field — active tenant, lifecycle, branch
//! membership, provider wiring, actor-authorization hooks — rather than the
//! single-tenant, always-permissive context the CLI hardcodes for itself.

pub mod command;
pub mod context;
pub mod harness;

pub use command::build_command;
pub use command::CommandParams;
pub use context::TestContext;
pub use harness::Harness;
