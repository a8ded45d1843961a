//! Break-even thresholds derived from payout tiers
//!
//! A slip of `n` independent legs, each winning with probability `p`, returns
//! `sum_h P(h hits) * multiplier_h` per unit staked. The per-leg break-even
//! probability is the `p` at which that return equals 1.0:
//! - one all-hit tier `M` (power play): `p = (1/M)^(1/n)`
//! - several tiers (flex play): solved by bisection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest slip size
pub const MIN_SLIP_SIZE: usize = 2;
/// Largest slip size
pub const MAX_SLIP_SIZE: usize = 6;

const BISECTION_EPSILON: f64 = 1e-12;
const BISECTION_MAX_ITERATIONS: usize = 200;

/// Threshold derivation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    /// No payout schedule or threshold for a slip size
    #[error("No payout schedule for {0}-leg slips")]
    UnsupportedSize(usize),
    /// Malformed payout tiers
    #[error("Invalid payout schedule for {size}-leg slips: {reason}")]
    InvalidSchedule { size: usize, reason: String },
    /// Payouts never reach break-even
    #[error("{0}-leg payout schedule cannot break even")]
    Unprofitable(usize),
}

/// Built-in payout schedule families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStyle {
    /// All legs must hit
    Power,
    /// Partial payouts for near misses
    #[default]
    Flex,
}

impl fmt::Display for PayoutStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutStyle::Power => f.write_str("power"),
            PayoutStyle::Flex => f.write_str("flex"),
        }
    }
}

impl FromStr for PayoutStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "power" => Ok(PayoutStyle::Power),
            "flex" => Ok(PayoutStyle::Flex),
            other => Err(format!("unknown payout style: {other}")),
        }
    }
}

/// Payout multiplier for a number of hits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutTier {
    pub hits: usize,
    pub multiplier: f64,
}

/// Payout tiers for one slip size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutSchedule {
    pub size: usize,
    pub tiers: Vec<PayoutTier>,
}

fn tier(hits: usize, multiplier: f64) -> PayoutTier {
    PayoutTier { hits, multiplier }
}

/// Payout tiers per slip size
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutTable {
    schedules: BTreeMap<usize, Vec<PayoutTier>>,
}

impl PayoutTable {
    /// All-or-nothing multipliers
    pub fn power() -> Self {
        let schedules = [(2, 3.0), (3, 6.0), (4, 10.0), (5, 20.0), (6, 37.5)]
            .into_iter()
            .map(|(size, multiplier)| (size, vec![tier(size, multiplier)]))
            .collect();
        Self { schedules }
    }

    /// Multipliers with partial payouts (sizes 3 through 6)
    pub fn flex() -> Self {
        let schedules = BTreeMap::from([
            (3, vec![tier(3, 3.0), tier(2, 1.0)]),
            (4, vec![tier(4, 6.0), tier(3, 1.5)]),
            (5, vec![tier(5, 10.0), tier(4, 2.0), tier(3, 0.4)]),
            (6, vec![tier(6, 25.0), tier(5, 2.0), tier(4, 0.4)]),
        ]);
        Self { schedules }
    }

    /// Table for a style; flex falls back to power where it has no schedule
    pub fn for_style(style: PayoutStyle) -> Self {
        match style {
            PayoutStyle::Power => Self::power(),
            PayoutStyle::Flex => {
                let mut table = Self::power();
                table.schedules.extend(Self::flex().schedules);
                table
            }
        }
    }

    /// Replace schedules for the given sizes
    pub fn with_overrides(mut self, overrides: &[PayoutSchedule]) -> Result<Self, ThresholdError> {
        for schedule in overrides {
            validate_schedule(schedule.size, &schedule.tiers)?;
            self.schedules.insert(schedule.size, schedule.tiers.clone());
        }
        Ok(self)
    }

    /// Payout tiers for a slip size
    pub fn tiers(&self, size: usize) -> Option<&[PayoutTier]> {
        self.schedules.get(&size).map(Vec::as_slice)
    }

    /// Slip sizes with a schedule
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.schedules.keys().copied()
    }

    /// Expected return per unit staked, minus the stake
    ///
    /// Legs are independent with their own probabilities.
    pub fn expected_return(&self, probs: &[f64]) -> Option<f64> {
        let tiers = self.tiers(probs.len())?;
        Some(payout_expectation(tiers, &hit_distribution(probs)) - 1.0)
    }
}

fn validate_schedule(size: usize, tiers: &[PayoutTier]) -> Result<(), ThresholdError> {
    let invalid = |reason: &str| ThresholdError::InvalidSchedule {
        size,
        reason: reason.to_string(),
    };

    if !(MIN_SLIP_SIZE..=MAX_SLIP_SIZE).contains(&size) {
        return Err(ThresholdError::UnsupportedSize(size));
    }
    if tiers.is_empty() {
        return Err(invalid("no tiers"));
    }
    if tiers.iter().any(|t| t.hits > size) {
        return Err(invalid("tier requires more hits than legs"));
    }
    if tiers.iter().any(|t| t.multiplier.is_nan() || t.multiplier <= 0.0) {
        return Err(invalid("multipliers must be positive"));
    }
    Ok(())
}

/// Probability of each hit count for independent legs (Poisson binomial)
pub fn hit_distribution(probs: &[f64]) -> Vec<f64> {
    let mut dist = vec![0.0; probs.len() + 1];
    dist[0] = 1.0;
    for (i, &p) in probs.iter().enumerate() {
        for hits in (1..=i + 1).rev() {
            dist[hits] = dist[hits] * (1.0 - p) + dist[hits - 1] * p;
        }
        dist[0] *= 1.0 - p;
    }
    dist
}

fn payout_expectation(tiers: &[PayoutTier], dist: &[f64]) -> f64 {
    tiers
        .iter()
        .filter_map(|t| dist.get(t.hits).map(|p| p * t.multiplier))
        .sum()
}

/// Per-leg break-even probability for a payout schedule
pub fn breakeven_per_leg(size: usize, tiers: &[PayoutTier]) -> Result<f64, ThresholdError> {
    validate_schedule(size, tiers)?;

    if let [only] = tiers {
        if only.hits == size {
            if only.multiplier <= 1.0 {
                return Err(ThresholdError::Unprofitable(size));
            }
            return Ok((1.0 / only.multiplier).powf(1.0 / size as f64));
        }
    }

    let excess = |p: f64| payout_expectation(tiers, &hit_distribution(&vec![p; size])) - 1.0;

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    if excess(lo) >= 0.0 || excess(hi) <= 0.0 {
        return Err(ThresholdError::Unprofitable(size));
    }

    for _ in 0..BISECTION_MAX_ITERATIONS {
        if hi - lo < BISECTION_EPSILON {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if excess(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(0.5 * (lo + hi))
}

/// Break-even requirement for one slip size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeThreshold {
    pub size: usize,
    /// Minimum win probability each leg must clear
    pub per_leg: f64,
    /// Combined probability at which the slip breaks even
    pub breakeven_combined: f64,
}

/// Per-size break-even thresholds, regenerated from a payout table
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    entries: BTreeMap<usize, SizeThreshold>,
}

impl ThresholdTable {
    /// Derive thresholds for every size in a payout table
    pub fn derive(payouts: &PayoutTable) -> Result<Self, ThresholdError> {
        let mut entries = BTreeMap::new();
        for size in payouts.sizes() {
            let tiers = payouts
                .tiers(size)
                .ok_or(ThresholdError::UnsupportedSize(size))?;
            let per_leg = breakeven_per_leg(size, tiers)?;
            entries.insert(
                size,
                SizeThreshold {
                    size,
                    per_leg,
                    breakeven_combined: per_leg.powi(size as i32),
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn get(&self, size: usize) -> Option<&SizeThreshold> {
        self.entries.get(&size)
    }

    pub fn per_leg(&self, size: usize) -> Option<f64> {
        self.get(size).map(|t| t.per_leg)
    }

    pub fn breakeven_combined(&self, size: usize) -> Option<f64> {
        self.get(size).map(|t| t.breakeven_combined)
    }

    /// Lowest per-leg threshold across sizes
    pub fn loosest(&self) -> Option<f64> {
        self.entries.values().map(|t| t.per_leg).reduce(f64::min)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SizeThreshold> {
        self.entries.values()
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let mut out = String::from("SIZE  PER-LEG    BREAK-EVEN\n");
        for t in self.iter() {
            out.push_str(&format!(
                "{:>4}  {:>7.2}%   {:>8.3}%\n",
                t.size,
                t.per_leg * 100.0,
                t.breakeven_combined * 100.0
            ));
        }
        out
    }
}
