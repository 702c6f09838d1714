// crates/bos-security/src/lib.rs
// ============================================================================
// Module: BOS Security
// Description: Security subsystem — rate limiter, anomaly detector, tenant
//              isolation, AI guardrail, resilience gate.
// Purpose: House every security-layer primitive the guard stack consults,
//          independent of dispatch orchestration (§4.5).
// Dependencies: bos-config, bos-core
// ============================================================================

//! ## Overview
//! Security-layer providers fail closed (§7): every function here returns a
//! denial on ambiguity rather than defaulting permissive. Contrast with the
//! governance guards (feature flag, compliance, document) in `bos-dispatcher`,
//! which fail open when their provider is entirely absent.

#![forbid(unsafe_code)]

pub mod ai_guardrail;
pub mod anomaly;
pub mod rate_limiter;
pub mod resilience;
pub mod tenant_isolation;

pub use ai_guardrail::AiAction;
pub use ai_guardrail::AiActionRequest;
pub use ai_guardrail::AiGuardrailVerdict;
pub use anomaly::AnomalyDetector;
pub use anomaly::AnomalyVerdict;
pub use anomaly::Severity;
pub use rate_limiter::RateLimitDecision;
pub use rate_limiter::RateLimiter;
