// crates/bos-security/src/anomaly.rs
// ============================================================================
// Module: BOS Anomaly Detector
// Description: Deterministic, rule-based anomaly detection over recent
//              per-(actor, tenant) activity.
// Purpose: Implement §4.5 "Anomaly detector" and the guard at §4.2 row 5.
// Dependencies: bos-config, bos-core, std::collections, std::sync, time
// ============================================================================

//! ## Overview
//! Three rules, each producing at most one finding per evaluation:
//! - *High velocity*: `>= N` commands within the velocity window → WARN.
//! - *Rapid branch switching*: `> M` distinct branches touched within the
//!   (shorter) branch-switch sub-window → BLOCK.
//! - *Repeated rejections*: `>= K` rejections of the same command type
//!   within the rejection window → WARN.
//!
//! [`AnomalyDetector::evaluate`] returns the highest-severity finding
//! (`BLOCK > WARN > INFO`), never a list — the guard only needs to know
//! whether to deny (§8 property 7).

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;

use bos_config::AnomalyDetectorConfig;
use bos_core::core::identifiers::ActorId;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::TenantId;
use time::Duration;
use time::OffsetDateTime;

/// One recorded activity sample.
#[derive(Debug, Clone)]
struct Activity {
    branch_id: Option<BranchId>,
    command_type: String,
    timestamp: OffsetDateTime,
    was_rejected: bool,
}

/// Severity of an anomaly finding, ordered `Info < Warn < Block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational only; never gates the command.
    Info,
    /// The command is allowed but the outcome is flagged.
    Warn,
    /// The command must be rejected.
    Block,
}

/// The result of an anomaly evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyVerdict {
    /// The highest severity finding produced this evaluation.
    pub severity: Severity,
    /// Human-readable description of the finding, empty when `severity` is `Info`.
    pub reason: String,
}

impl AnomalyVerdict {
    const fn clean() -> Self {
        Self { severity: Severity::Info, reason: String::new() }
    }
}

/// Rule-based anomaly detector over recent per-`(actor, tenant)` activity.
#[derive(Debug)]
pub struct AnomalyDetector {
    config: AnomalyDetectorConfig,
    activity: Mutex<HashMap<(ActorId, TenantId), Vec<Activity>>>,
}

impl AnomalyDetector {
    /// Creates a detector with the given thresholds.
    #[must_use]
    pub fn new(config: AnomalyDetectorConfig) -> Self {
        Self { config, activity: Mutex::new(HashMap::new()) }
    }

    /// Records one activity sample for `(actor_id, tenant_id)`.
    pub fn record(
        &self,
        actor_id: &ActorId,
        tenant_id: TenantId,
        branch_id: Option<BranchId>,
        command_type: &str,
        now: OffsetDateTime,
        was_rejected: bool,
    ) {
        let retention = self.retention_window();
        let mut activity = self.activity.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let samples = activity.entry((actor_id.clone(), tenant_id)).or_default();
        samples.push(Activity { branch_id, command_type: command_type.to_string(), timestamp: now, was_rejected });
        samples.retain(|sample| sample.timestamp > now - retention);
    }

    /// Evaluates the highest-severity finding for `(actor_id, tenant_id)` as of `now`.
    #[must_use]
    pub fn evaluate(&self, actor_id: &ActorId, tenant_id: TenantId, now: OffsetDateTime) -> AnomalyVerdict {
        let activity = self.activity.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(samples) = activity.get(&(actor_id.clone(), tenant_id)) else {
            return AnomalyVerdict::clean();
        };

        let branch_window = Duration::seconds(i64::try_from(self.config.rapid_branch_switch_window_seconds).unwrap_or(30));
        let distinct_branches: HashSet<BranchId> = samples
            .iter()
            .filter(|sample| sample.timestamp > now - branch_window)
            .filter_map(|sample| sample.branch_id)
            .collect();
        if distinct_branches.len() as u32 > self.config.rapid_branch_switch_threshold {
            return AnomalyVerdict {
                severity: Severity::Block,
                reason: format!(
                    "rapid branch switching: {} distinct branches within {}s",
                    distinct_branches.len(),
                    self.config.rapid_branch_switch_window_seconds
                ),
            };
        }

        let velocity_window = Duration::seconds(i64::try_from(self.config.high_velocity_window_seconds).unwrap_or(60));
        let recent_count = samples.iter().filter(|sample| sample.timestamp > now - velocity_window).count();
        let mut verdict = if recent_count as u32 >= self.config.high_velocity_threshold {
            AnomalyVerdict {
                severity: Severity::Warn,
                reason: format!("high velocity: {recent_count} commands within {}s", self.config.high_velocity_window_seconds),
            }
        } else {
            AnomalyVerdict::clean()
        };

        let rejection_window = Duration::seconds(i64::try_from(self.config.repeated_rejection_window_seconds).unwrap_or(60));
        let mut rejections_by_type: HashMap<&str, u32> = HashMap::new();
        for sample in samples.iter().filter(|sample| sample.was_rejected && sample.timestamp > now - rejection_window) {
            *rejections_by_type.entry(sample.command_type.as_str()).or_insert(0) += 1;
        }
        if let Some((command_type, count)) = rejections_by_type
            .into_iter()
            .find(|(_, count)| *count >= self.config.repeated_rejection_threshold)
        {
            let repeated = AnomalyVerdict {
                severity: Severity::Warn,
                reason: format!("repeated rejections: {count} of `{command_type}` within {}s", self.config.repeated_rejection_window_seconds),
            };
            if repeated.severity > verdict.severity {
                verdict = repeated;
            }
        }

        verdict
    }

    fn retention_window(&self) -> Duration {
        let seconds = self
            .config
            .high_velocity_window_seconds
            .max(self.config.rapid_branch_switch_window_seconds)
            .max(self.config.repeated_rejection_window_seconds);
        Duration::seconds(i64::try_from(seconds).unwrap_or(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(AnomalyDetectorConfig {
            high_velocity_threshold: 3,
            high_velocity_window_seconds: 60,
            rapid_branch_switch_threshold: 2,
            rapid_branch_switch_window_seconds: 30,
            repeated_rejection_threshold: 2,
            repeated_rejection_window_seconds: 60,
        })
    }

    #[test]
    fn clean_history_is_info() {
        let detector = detector();
        let actor = ActorId::new("user-1").expect("valid");
        let tenant = TenantId::new();
        assert_eq!(detector.evaluate(&actor, tenant, datetime!(2026-01-01 00:00:00 UTC)).severity, Severity::Info);
    }

    #[test]
    fn block_wins_over_warn_when_both_conditions_hold() {
        let detector = detector();
        let actor = ActorId::new("user-1").expect("valid");
        let tenant = TenantId::new();
        let t0 = datetime!(2026-01-01 00:00:00 UTC);

        for i in 0..4 {
            detector.record(&actor, tenant, Some(BranchId::new()), "cash.session.open.request", t0 + Duration::seconds(i), false);
        }
        let verdict = detector.evaluate(&actor, tenant, t0 + Duration::seconds(5));
        assert_eq!(verdict.severity, Severity::Block);
    }

    #[test]
    fn repeated_rejections_of_same_type_warn() {
        let detector = detector();
        let actor = ActorId::new("user-1").expect("valid");
        let tenant = TenantId::new();
        let t0 = datetime!(2026-01-01 00:00:00 UTC);
        detector.record(&actor, tenant, None, "cash.session.open.request", t0, true);
        detector.record(&actor, tenant, None, "cash.session.open.request", t0 + Duration::seconds(1), true);
        let verdict = detector.evaluate(&actor, tenant, t0 + Duration::seconds(2));
        assert_eq!(verdict.severity, Severity::Warn);
    }
}
