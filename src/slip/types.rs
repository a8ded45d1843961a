//! Slip types

use crate::edge::EdgeProp;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Position of a slip in the search's draw sequence
///
/// Exhaustive enumeration uses round 0, worker 0 and the enumeration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct DrawOrder {
    pub round: u32,
    pub worker: u32,
    pub sample: u64,
}

/// How slips of one size are searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Every combination enumerated
    Exhaustive,
    /// Random subsets drawn under a sample budget
    MonteCarlo,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Exhaustive => f.write_str("exhaustive"),
            SearchStrategy::MonteCarlo => f.write_str("monte_carlo"),
        }
    }
}

/// Ranking rule shared by every search path
///
/// `combined_edge` descending, then `combined_prob` descending, then draw order.
pub fn rank_cmp(
    a: (f64, f64, DrawOrder),
    b: (f64, f64, DrawOrder),
) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| b.1.total_cmp(&a.1))
        .then_with(|| a.2.cmp(&b.2))
}

/// A legal, scored multi-leg slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipCandidate {
    pub size: usize,
    pub legs: Vec<EdgeProp>,
    /// Product of leg probabilities
    pub combined_prob: f64,
    /// Combined probability above the size's break-even
    pub combined_edge: f64,
    /// Payout-weighted return per unit staked, minus the stake
    pub expected_return: f64,
    pub teams: BTreeSet<String>,
    pub draw_order: DrawOrder,
}

impl SlipCandidate {
    pub fn players(&self) -> Vec<&str> {
        self.legs.iter().map(EdgeProp::player).collect()
    }

    /// Mean leg probability
    pub fn avg_leg_prob(&self) -> f64 {
        if self.legs.is_empty() {
            return 0.0;
        }
        self.legs.iter().map(|l| l.edge_prob).sum::<f64>() / self.legs.len() as f64
    }

    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        rank_cmp(
            (self.combined_edge, self.combined_prob, self.draw_order),
            (other.combined_edge, other.combined_prob, other.draw_order),
        )
    }
}

/// Ranked output for one slip size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeResult {
    pub size: usize,
    pub strategy: SearchStrategy,
    /// Props that cleared the size's threshold
    pub eligible: usize,
    /// Combinations enumerated or sampled
    pub evaluated: u64,
    /// Combinations that passed the diversity rules
    pub legal: u64,
    /// Fewer than top-N slips found within the sampling budget
    pub partial: bool,
    /// Exclusive-leg filtering left fewer than top-N slips
    #[serde(default)]
    pub exclusive_thinned: bool,
    /// Best first
    pub slips: Vec<SlipCandidate>,
}

impl SizeResult {
    /// Result for a size with no search performed
    pub fn empty(size: usize, eligible: usize) -> Self {
        Self {
            size,
            strategy: SearchStrategy::Exhaustive,
            eligible,
            evaluated: 0,
            legal: 0,
            partial: false,
            exclusive_thinned: false,
            slips: Vec::new(),
        }
    }
}
