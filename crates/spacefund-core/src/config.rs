//! Configuration loading and typed config structures for the Space Fund game.
//!
//! The configuration lives in `spacefund-config.yaml`. Every section and
//! field has a default matching the shipped game balance, so an empty or
//! missing file yields a playable configuration.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use spacefund_types::Difficulty;

/// Environment variable selecting the configuration file path.
pub const CONFIG_PATH_ENV: &str = "SPACEFUND_CONFIG";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "spacefund-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but cannot drive a session.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Funds, days, and the day clock.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Offer feed sizing and cadence.
    #[serde(default)]
    pub offers: OfferConfig,

    /// Mission flight timers.
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Prediction service location and fallbacks.
    #[serde(default)]
    pub predictor: PredictorConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `PREDICTOR_URL` overrides `predictor.base_url` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.predictor.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from the path in [`CONFIG_PATH_ENV`], or
    /// [`DEFAULT_CONFIG_PATH`]. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns any error from [`GameConfig::from_file`] other than the file
    /// not existing.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        match Self::from_file(Path::new(&path)) {
            Err(ConfigError::Io { source }) if source.kind() == std::io::ErrorKind::NotFound => {
                Self::parse("")
            }
            other => other,
        }
    }

    /// Reject values that would stall or break a session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.economy.day_interval_ms == 0 {
            return invalid("economy.day_interval_ms must be at least 1");
        }
        if self.economy.victory_multiplier == 0 {
            return invalid("economy.victory_multiplier must be at least 1");
        }
        if self.offers.refresh_every_days == 0 {
            return invalid("offers.refresh_every_days must be at least 1");
        }
        if self.offers.refill_min > self.offers.refill_max {
            return invalid("offers.refill_min must not exceed offers.refill_max");
        }
        if self.progress.tick_interval_ms == 0 || self.progress.ms_per_year == 0 {
            return invalid("progress intervals must be at least 1ms");
        }
        let p = &self.predictor;
        if !(0.0..=100.0).contains(&p.fallback_min)
            || !(0.0..=100.0).contains(&p.fallback_max)
            || p.fallback_min >= p.fallback_max
        {
            return invalid("predictor fallback range must be a non-empty range within 0..=100");
        }
        if p.clamp_min > p.clamp_max {
            return invalid("predictor.clamp_min must not exceed predictor.clamp_max");
        }
        Ok(())
    }
}

/// Funds, days, and the day clock.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Balance at the start of a session.
    #[serde(default = "default_initial_funds")]
    pub initial_funds: u64,

    /// Victory when funds reach `initial_funds * victory_multiplier`.
    #[serde(default = "default_victory_multiplier")]
    pub victory_multiplier: u32,

    /// Days on the clock at the start of a session.
    #[serde(default = "default_initial_days")]
    pub initial_days: u32,

    /// Real-time milliseconds per game day.
    #[serde(default = "default_day_interval_ms")]
    pub day_interval_ms: u64,
}

impl EconomyConfig {
    /// Starting balance as money.
    pub fn initial_funds(&self) -> Decimal {
        Decimal::from(self.initial_funds)
    }

    /// Balance that ends the session in victory.
    pub fn target_funds(&self) -> Decimal {
        Decimal::from(self.initial_funds)
            .checked_mul(Decimal::from(self.victory_multiplier))
            .unwrap_or(Decimal::MAX)
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_funds: default_initial_funds(),
            victory_multiplier: default_victory_multiplier(),
            initial_days: default_initial_days(),
            day_interval_ms: default_day_interval_ms(),
        }
    }
}

/// Offer feed sizing and cadence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OfferConfig {
    /// Offers requested when the board opens empty or is reset.
    #[serde(default = "default_initial_batch")]
    pub initial_batch: usize,

    /// Refresh whenever the day count lands on a multiple of this.
    #[serde(default = "default_refresh_every_days")]
    pub refresh_every_days: u32,

    /// Most offers evicted per refresh, oldest first.
    #[serde(default = "default_evict_max")]
    pub evict_max: usize,

    /// Smallest refill batch.
    #[serde(default = "default_refill_min")]
    pub refill_min: usize,

    /// Largest refill batch.
    #[serde(default = "default_refill_max")]
    pub refill_max: usize,

    /// Preset band requested from the prediction service.
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Default for OfferConfig {
    fn default() -> Self {
        Self {
            initial_batch: default_initial_batch(),
            refresh_every_days: default_refresh_every_days(),
            evict_max: default_evict_max(),
            refill_min: default_refill_min(),
            refill_max: default_refill_max(),
            difficulty: Difficulty::default(),
        }
    }
}

/// Mission flight timers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressConfig {
    /// Real-time milliseconds between progress ticks.
    #[serde(default = "default_progress_tick_ms")]
    pub tick_interval_ms: u64,

    /// Real-time milliseconds one mission year takes to fly.
    #[serde(default = "default_ms_per_year")]
    pub ms_per_year: u64,
}

impl ProgressConfig {
    /// Percent of progress gained per tick for a mission of the given
    /// duration. Durations too short to span a full tick complete in one.
    #[allow(clippy::cast_precision_loss)]
    pub fn step_for(&self, duration_years: f64) -> f64 {
        let total_ms = duration_years * self.ms_per_year as f64;
        let total_ticks = total_ms / self.tick_interval_ms as f64;
        if total_ticks.is_finite() && total_ticks > 1.0 {
            100.0 / total_ticks
        } else {
            100.0
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_progress_tick_ms(),
            ms_per_year: default_ms_per_year(),
        }
    }
}

/// Prediction service location and fallbacks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictorConfig {
    /// Base URL of the prediction service.
    #[serde(default = "default_predictor_url")]
    pub base_url: String,

    /// Lower clamp sent with every prediction request.
    #[serde(default)]
    pub clamp_min: f64,

    /// Upper clamp sent with every prediction request.
    #[serde(default = "default_clamp_max")]
    pub clamp_max: f64,

    /// Lower bound of the random stand-in when a prediction fails.
    #[serde(default = "default_fallback_min")]
    pub fallback_min: f64,

    /// Upper bound (exclusive) of the random stand-in.
    #[serde(default = "default_fallback_max")]
    pub fallback_max: f64,
}

impl PredictorConfig {
    /// Override the service URL with `PREDICTOR_URL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PREDICTOR_URL") {
            self.base_url = val;
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            base_url: default_predictor_url(),
            clamp_min: 0.0,
            clamp_max: default_clamp_max(),
            fallback_min: default_fallback_min(),
            fallback_max: default_fallback_max(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_initial_funds() -> u64 {
    1_000_000
}

const fn default_victory_multiplier() -> u32 {
    5
}

const fn default_initial_days() -> u32 {
    30
}

const fn default_day_interval_ms() -> u64 {
    3_000
}

const fn default_initial_batch() -> usize {
    5
}

const fn default_refresh_every_days() -> u32 {
    10
}

const fn default_evict_max() -> usize {
    2
}

const fn default_refill_min() -> usize {
    2
}

const fn default_refill_max() -> usize {
    3
}

const fn default_progress_tick_ms() -> u64 {
    100
}

const fn default_ms_per_year() -> u64 {
    3_000
}

fn default_predictor_url() -> String {
    "http://localhost:8000".to_owned()
}

const fn default_clamp_max() -> f64 {
    100.0
}

const fn default_fallback_min() -> f64 {
    30.0
}

const fn default_fallback_max() -> f64 {
    70.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_game_balance() {
        let config = GameConfig::default();
        assert_eq!(config.economy.initial_funds, 1_000_000);
        assert_eq!(config.economy.target_funds(), Decimal::from(5_000_000));
        assert_eq!(config.economy.initial_days, 30);
        assert_eq!(config.economy.day_interval_ms, 3_000);
        assert_eq!(config.offers.initial_batch, 5);
        assert_eq!(config.offers.difficulty, Difficulty::Normal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_yaml_keeps_defaults() {
        let yaml = r"
economy:
  initial_days: 50
offers:
  difficulty: hard
progress:
  tick_interval_ms: 50
";
        let config = GameConfig::parse(yaml).unwrap();
        assert_eq!(config.economy.initial_days, 50);
        assert_eq!(config.economy.initial_funds, 1_000_000);
        assert_eq!(config.offers.difficulty, Difficulty::Hard);
        assert_eq!(config.offers.refresh_every_days, 10);
        assert_eq!(config.progress.tick_interval_ms, 50);
        assert_eq!(config.progress.ms_per_year, 3_000);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = GameConfig::parse("   \n").unwrap();
        assert_eq!(config.economy, EconomyConfig::default());
        assert_eq!(config.offers, OfferConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = GameConfig::parse("economy: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn zero_day_interval_is_rejected() {
        let result = GameConfig::parse("economy:\n  day_interval_ms: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn inverted_refill_range_is_rejected() {
        let result = GameConfig::parse("offers:\n  refill_min: 4\n  refill_max: 2\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn fallback_range_outside_percent_is_rejected() {
        let result = GameConfig::parse("predictor:\n  fallback_max: 150.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn progress_step_scales_with_duration() {
        let progress = ProgressConfig::default();
        // 2 years * 3000ms / 100ms = 60 ticks -> 100/60 percent per tick
        let step = progress.step_for(2.0);
        assert!((step - 100.0 / 60.0).abs() < 1e-9);
        // Under one tick of flight time completes immediately.
        assert!((progress.step_for(0.01) - 100.0).abs() < f64::EPSILON);
        assert!((progress.step_for(f64::NAN) - 100.0).abs() < f64::EPSILON);
    }
}
