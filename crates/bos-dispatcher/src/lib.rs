// crates/bos-dispatcher/src/lib.rs
// ============================================================================
// Module: BOS Dispatcher
// Description: The command dispatcher — structural validation, context
//              validation, the fixed eleven-row guard stack, handler
//              dispatch, and outcome reporting.
// Purpose: Implement §4.1 "Command Dispatcher" and §4.2 "Policy Guard Stack"
//          as the sole entrance for state change.
// Dependencies: bos-config, bos-core, bos-events, bos-security
// ============================================================================

//! ## Overview
//! `dispatcher` owns the stateful `Dispatcher` that orchestrates every call;
//! `guards` holds the pure decision functions the dispatcher consults for the
//! guard rows it does not delegate to `bos-security`; `outcome` defines the
//! terminal `Outcome` value, the `CommandHandler` trait engines implement,
//! and dispatcher-level errors.

#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod guards;
pub mod outcome;

pub use dispatcher::COMPLIANCE_FLAG_KEY;
pub use dispatcher::DOCUMENT_DESIGNER_FLAG_KEY;
pub use dispatcher::Dispatcher;
pub use outcome::CommandHandler;
pub use outcome::DispatcherError;
pub use outcome::ExecutionResult;
pub use outcome::Outcome;
