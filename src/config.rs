//! Configuration types for prop-ev

use crate::slip::{PayoutSchedule, PayoutStyle, MAX_SLIP_SIZE, MIN_SLIP_SIZE};
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub payout: PayoutConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Invalid configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("line_tolerance must be non-negative, got {0}")]
    NegativeTolerance(Decimal),
    #[error("min_distinct_teams must be at least 1")]
    NoTeamMinimum,
    #[error("slip size {0} outside supported range 2..=6")]
    UnsupportedSize(usize),
    #[error("top_n_per_size must be at least 1")]
    ZeroTopN,
    #[error("sampling.workers must be at least 1")]
    ZeroWorkers,
    #[error("sampling.max_sampling_rounds must be at least 1")]
    ZeroRounds,
    #[error("line_adjustment_factor must be a finite non-negative number, got {0}")]
    InvalidAdjustmentFactor(f64),
    #[error("monte_carlo_sample_budget key {0:?} is not a slip size in 2..=6")]
    InvalidBudgetKey(String),
}

/// Edge evaluation and ranking configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Maximum |fixed - reference| line gap for comparable props
    #[serde(default = "default_line_tolerance")]
    pub line_tolerance: Decimal,

    /// Probability shift per half point of favorable line gap
    #[serde(default)]
    pub line_adjustment_factor: f64,

    /// Minimum distinct teams across a slip's legs
    #[serde(default = "default_min_distinct_teams")]
    pub min_distinct_teams: usize,

    /// Slips kept per size after ranking
    #[serde(default = "default_top_n")]
    pub top_n_per_size: usize,

    /// Seed for Monte Carlo sampling
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Slip sizes to build
    #[serde(default = "default_slip_sizes")]
    pub slip_sizes: Vec<usize>,

    /// Length of the single-prop leaderboard
    #[serde(default = "default_top_props")]
    pub top_props: usize,

    /// Drop slips that reuse a leg from a better-ranked slip
    #[serde(default)]
    pub exclusive_legs: bool,
}

fn default_line_tolerance() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_min_distinct_teams() -> usize {
    2
}
fn default_top_n() -> usize {
    10
}
fn default_random_seed() -> u64 {
    42
}
fn default_slip_sizes() -> Vec<usize> {
    (MIN_SLIP_SIZE..=MAX_SLIP_SIZE).collect()
}
fn default_top_props() -> usize {
    50
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            line_tolerance: default_line_tolerance(),
            line_adjustment_factor: 0.0,
            min_distinct_teams: default_min_distinct_teams(),
            top_n_per_size: default_top_n(),
            random_seed: default_random_seed(),
            slip_sizes: default_slip_sizes(),
            top_props: default_top_props(),
            exclusive_legs: false,
        }
    }
}

/// Slip search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplingConfig {
    /// Monte Carlo draws per round when a size has no explicit budget
    #[serde(default = "default_sample_budget")]
    pub default_sample_budget: u64,

    /// Per-size Monte Carlo budgets, keyed by slip size ("5" = 150000)
    #[serde(default)]
    pub monte_carlo_sample_budget: BTreeMap<String, u64>,

    /// Sampling worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Rounds of sampling before a short result is reported as partial
    #[serde(default = "default_max_rounds")]
    pub max_sampling_rounds: u32,

    /// Largest C(n, k) enumerated exhaustively
    #[serde(default = "default_exhaustive_limit")]
    pub exhaustive_limit: u64,
}

fn default_sample_budget() -> u64 {
    200_000
}
fn default_workers() -> usize {
    4
}
fn default_max_rounds() -> u32 {
    3
}
fn default_exhaustive_limit() -> u64 {
    250_000
}

impl SamplingConfig {
    /// Monte Carlo budget for one round at a slip size
    pub fn budget_for(&self, size: usize) -> u64 {
        self.monte_carlo_sample_budget
            .get(&size.to_string())
            .copied()
            .unwrap_or(self.default_sample_budget)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            default_sample_budget: default_sample_budget(),
            monte_carlo_sample_budget: BTreeMap::new(),
            workers: default_workers(),
            max_sampling_rounds: default_max_rounds(),
            exhaustive_limit: default_exhaustive_limit(),
        }
    }
}

/// Payout structure configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PayoutConfig {
    /// Built-in payout schedule
    #[serde(default)]
    pub style: PayoutStyle,

    /// Per-size tier overrides
    #[serde(default)]
    pub custom: Vec<PayoutSchedule>,
}

/// Input/output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Quote file or directory of quote files
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Directory for published slip tables
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("props")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.line_tolerance.is_sign_negative() {
            return Err(ConfigError::NegativeTolerance(self.engine.line_tolerance));
        }
        let factor = self.engine.line_adjustment_factor;
        if !factor.is_finite() || factor < 0.0 {
            return Err(ConfigError::InvalidAdjustmentFactor(factor));
        }
        if self.engine.min_distinct_teams == 0 {
            return Err(ConfigError::NoTeamMinimum);
        }
        if self.engine.top_n_per_size == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        if let Some(&size) = self
            .engine
            .slip_sizes
            .iter()
            .find(|s| !(MIN_SLIP_SIZE..=MAX_SLIP_SIZE).contains(*s))
        {
            return Err(ConfigError::UnsupportedSize(size));
        }
        if self.sampling.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.sampling.max_sampling_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        // Budgets are looked up by `size.to_string()`, so "06" would never match
        for key in self.sampling.monte_carlo_sample_budget.keys() {
            let is_size = key.parse::<usize>().is_ok_and(|size| {
                size.to_string() == *key && (MIN_SLIP_SIZE..=MAX_SLIP_SIZE).contains(&size)
            });
            if !is_size {
                return Err(ConfigError::InvalidBudgetKey(key.clone()));
            }
        }
        Ok(())
    }
}
