// crates/bos-config/src/lib.rs
// ============================================================================
// Module: BOS Config
// Description: Strict configuration loading for the security subsystem.
// Purpose: Give operators a single TOML surface for rate-limiter tiers and
//          anomaly-detector thresholds without touching code.
// Dependencies: bos-core, serde, toml
// ============================================================================

//! ## Overview
//! `bos-config` depends only on `bos-core` (for [`bos_core::core::command::ActorKind`]).
//! It has no dependency on the dispatcher, security, or any engine crate.

#![forbid(unsafe_code)]

mod config;

pub use config::AnomalyDetectorConfig;
pub use config::BosConfig;
pub use config::ConfigError;
pub use config::RateLimitTier;
pub use config::RateLimiterConfig;
pub use config::CONFIG_ENV_VAR;
pub use config::MAX_CONFIG_FILE_SIZE;
pub use config::RATE_LIMITER_WINDOW_SECONDS;
