// crates/bos-security/src/rate_limiter.rs
// ============================================================================
// Module: BOS Rate Limiter
// Description: Sliding-window rate limiter per (actor_id, tenant_id) bucket.
// Purpose: Implement §4.5 "Rate limiter" and the guard at §4.2 row 4.
// Dependencies: bos-config, bos-core, std::collections, std::sync, time
// ============================================================================

//! ## Overview
//! The window is always 60 seconds (§4.5). Time is always injected via a
//! [`bos_core::core::time::Clock`] — the limiter never reads the wall clock
//! itself, so tests can drive it deterministically (§8 property 6, scenario
//! S5). Per-bucket state is guarded by its own mutex so that sequential
//! commands from one actor serialise their evictions and increments without
//! blocking unrelated buckets (§5 "Ordering guarantees").

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use bos_config::RateLimiterConfig;
use bos_config::RATE_LIMITER_WINDOW_SECONDS;
use bos_core::core::command::ActorKind;
use bos_core::core::identifiers::ActorId;
use bos_core::core::identifiers::TenantId;
use time::Duration;
use time::OffsetDateTime;

/// The outcome of a [`RateLimiter::check`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The call fits within the window; it has been recorded.
    Allowed,
    /// The call exceeds the effective limit.
    Denied {
        /// Seconds until the oldest recorded call ages out of the window.
        /// Advisory only (§5 "Timeouts").
        retry_after_seconds: u64,
    },
}

#[derive(Debug, Default)]
struct Bucket {
    stamps: VecDeque<OffsetDateTime>,
}

/// Sliding-window rate limiter keyed by `(actor_id, tenant_id)`.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    buckets: Mutex<HashMap<(ActorId, TenantId), Bucket>>,
}

impl RateLimiter {
    /// Creates a rate limiter with the given per-actor-kind tiers.
    #[must_use]
    pub fn new(config: RateLimiterConfig) -> Self {
        Self { config, buckets: Mutex::new(HashMap::new()) }
    }

    /// Checks and, if allowed, records a call for `(actor_id, tenant_id)` at `now`.
    pub fn check(&self, actor_id: &ActorId, tenant_id: TenantId, kind: ActorKind, now: OffsetDateTime) -> RateLimitDecision {
        let window = Duration::seconds(i64::try_from(RATE_LIMITER_WINDOW_SECONDS).unwrap_or(60));
        let limit = self.config.tier_for(kind).effective_limit();
        let mut buckets = self.buckets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let bucket = buckets.entry((actor_id.clone(), tenant_id)).or_default();

        while let Some(oldest) = bucket.stamps.front() {
            if *oldest <= now - window {
                bucket.stamps.pop_front();
            } else {
                break;
            }
        }

        if bucket.stamps.len() < limit as usize {
            bucket.stamps.push_back(now);
            return RateLimitDecision::Allowed;
        }

        let oldest = bucket.stamps.front().copied().unwrap_or(now);
        let free_at = oldest + window;
        let retry_after_seconds = (free_at - now).whole_seconds().max(0);
        RateLimitDecision::Denied {
            retry_after_seconds: u64::try_from(retry_after_seconds).unwrap_or(0),
        }
    }
}
