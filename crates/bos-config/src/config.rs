// crates/bos-config/src/config.rs
// ============================================================================
// Module: BOS Configuration
// Description: Strict TOML configuration for the security subsystem tiers.
// Purpose: Keep rate-limiter and anomaly-detector thresholds out of code so
//          operators can tune them without a rebuild, while still failing
//          closed on malformed input.
// Dependencies: bos-core, serde, toml
// ============================================================================

//! ## Overview
//! BOS configuration is loaded from a TOML file with a hard size limit and
//! validated before use — a malformed or missing configuration fails the
//! load rather than silently falling back to defaults that might be weaker
//! than intended. Defaults are still supplied per-field through
//! [`serde(default)`] so operators only need to override what differs from
//! the stock tiers.

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use bos_core::core::command::ActorKind;
use serde::Deserialize;
use serde::Serialize;

/// Default configuration filename when no path is given.
const DEFAULT_CONFIG_NAME: &str = "bos.toml";
/// Environment variable overriding the configuration path.
pub const CONFIG_ENV_VAR: &str = "BOS_CONFIG";
/// Maximum accepted configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;
/// Sliding window size used by the rate limiter (§4.5), in seconds.
pub const RATE_LIMITER_WINDOW_SECONDS: u64 = 60;

/// Per-`ActorKind` rate limiter tier: base allowance plus burst headroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitTier {
    /// Steady-state commands allowed per 60s window.
    pub base_per_minute: u32,
    /// Additional commands allowed on top of the base, same window.
    #[serde(default)]
    pub burst: u32,
}

impl RateLimitTier {
    /// Returns `base_per_minute + burst`, the effective ceiling for the window.
    #[must_use]
    pub const fn effective_limit(&self) -> u32 {
        self.base_per_minute.saturating_add(self.burst)
    }
}

/// Rate limiter tiers for every [`ActorKind`] (§4.2 row 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Tier applied to `HUMAN` actors.
    pub human: RateLimitTier,
    /// Tier applied to `SYSTEM` actors.
    pub system: RateLimitTier,
    /// Tier applied to `DEVICE` actors.
    pub device: RateLimitTier,
    /// Tier applied to `AI` actors.
    pub ai: RateLimitTier,
}

impl RateLimiterConfig {
    /// Returns the tier configured for `kind`.
    #[must_use]
    pub const fn tier_for(&self, kind: ActorKind) -> RateLimitTier {
        match kind {
            ActorKind::Human => self.human,
            ActorKind::System => self.system,
            ActorKind::Device => self.device,
            ActorKind::Ai => self.ai,
        }
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            human: RateLimitTier { base_per_minute: 60, burst: 10 },
            system: RateLimitTier { base_per_minute: 300, burst: 50 },
            device: RateLimitTier { base_per_minute: 120, burst: 20 },
            ai: RateLimitTier { base_per_minute: 30, burst: 5 },
        }
    }
}

/// Thresholds driving the rule-based anomaly detector (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyDetectorConfig {
    /// `N`: command count within `high_velocity_window_seconds` that triggers
    /// a WARN-severity "high velocity" finding.
    pub high_velocity_threshold: u32,
    /// Window, in seconds, over which high-velocity commands are counted.
    pub high_velocity_window_seconds: u64,
    /// `M`: distinct branches touched within `rapid_branch_switch_window_seconds`
    /// that triggers a BLOCK-severity "rapid branch switching" finding.
    pub rapid_branch_switch_threshold: u32,
    /// Sub-window, in seconds, over which distinct branches are counted.
    pub rapid_branch_switch_window_seconds: u64,
    /// `K`: rejections of the same command type within
    /// `repeated_rejection_window_seconds` that triggers a WARN-severity
    /// "repeated rejections" finding.
    pub repeated_rejection_threshold: u32,
    /// Window, in seconds, over which repeated rejections are counted.
    pub repeated_rejection_window_seconds: u64,
}

impl Default for AnomalyDetectorConfig {
    fn default() -> Self {
        Self {
            high_velocity_threshold: 100,
            high_velocity_window_seconds: 60,
            rapid_branch_switch_threshold: 3,
            rapid_branch_switch_window_seconds: 30,
            repeated_rejection_threshold: 5,
            repeated_rejection_window_seconds: 60,
        }
    }
}

/// Top-level BOS configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BosConfig {
    /// Rate limiter tiers, keyed by actor kind.
    #[serde(default)]
    pub rate_limiter: RateLimiterConfig,
    /// Anomaly detector thresholds.
    #[serde(default)]
    pub anomaly_detector: AnomalyDetectorConfig,
}

/// Errors loading or validating a [`BosConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file exceeded [`MAX_CONFIG_FILE_SIZE`].
    #[error("configuration file {path} is {size} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit")]
    TooLarge {
        /// The oversized path.
        path: PathBuf,
        /// The file's actual size in bytes.
        size: u64,
    },
    /// The file contents were not valid TOML for [`BosConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A tier or threshold failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl BosConfig {
    /// Loads configuration from `path`, validating it before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the size
    /// limit, fails to parse, or fails validation.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE as u64 {
            return Err(ConfigError::TooLarge { path: path.to_path_buf(), size: metadata.len() });
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the path named by [`CONFIG_ENV_VAR`], falling
    /// back to [`DEFAULT_CONFIG_NAME`] in the current directory, falling back
    /// further to [`BosConfig::default`] when neither exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a configuration file exists but fails to
    /// load or validate.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::load_from(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_NAME);
        if default_path.exists() {
            return Self::load_from(default_path);
        }
        Ok(Self::default())
    }

    /// Validates every tier and threshold is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a tier's `base_per_minute` is
    /// zero, or when any anomaly-detector window is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, tier) in [
            ("human", self.rate_limiter.human),
            ("system", self.rate_limiter.system),
            ("device", self.rate_limiter.device),
            ("ai", self.rate_limiter.ai),
        ] {
            if tier.base_per_minute == 0 {
                return Err(ConfigError::Invalid(format!("rate_limiter.{name}.base_per_minute must be non-zero")));
            }
        }
        let anomaly = self.anomaly_detector;
        if anomaly.high_velocity_window_seconds == 0
            || anomaly.rapid_branch_switch_window_seconds == 0
            || anomaly.repeated_rejection_window_seconds == 0
        {
            return Err(ConfigError::Invalid("anomaly_detector windows must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(BosConfig::default().validate().is_ok());
    }

    #[test]
    fn tier_for_selects_matching_actor_kind() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.tier_for(ActorKind::Human), config.human);
        assert_eq!(config.tier_for(ActorKind::Ai), config.ai);
    }

    #[test]
    fn zero_base_limit_fails_validation() {
        let mut config = BosConfig::default();
        config.rate_limiter.human.base_per_minute = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_from_rejects_oversized_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bos.toml");
        let oversized = "# ".repeat(MAX_CONFIG_FILE_SIZE);
        fs::write(&path, oversized).expect("write");
        assert!(matches!(BosConfig::load_from(&path), Err(ConfigError::TooLarge { .. })));
    }

    #[test]
    fn load_from_parses_partial_overrides_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bos.toml");
        fs::write(
            &path,
            r#"
            [rate_limiter.human]
            base_per_minute = 2
            burst = 0

            [rate_limiter.system]
            base_per_minute = 600
            burst = 100

            [rate_limiter.device]
            base_per_minute = 240
            burst = 40

            [rate_limiter.ai]
            base_per_minute = 60
            burst = 10

            [anomaly_detector]
            high_velocity_threshold = 50
            high_velocity_window_seconds = 60
            rapid_branch_switch_threshold = 3
            rapid_branch_switch_window_seconds = 30
            repeated_rejection_threshold = 5
            repeated_rejection_window_seconds = 60
            "#,
        )
        .expect("write");
        let config = BosConfig::load_from(&path).expect("valid config");
        assert_eq!(config.rate_limiter.human.effective_limit(), 2);
    }
}
