//! Slip search
//!
//! Strategy is chosen per size from the pool: two-leg slips and any size whose
//! C(n, k) fits under the exhaustive limit are enumerated; larger spaces are
//! sampled. Sampling is a heuristic search and may miss the true optimum.

use super::ranking::{ScoredCombo, TopN};
use super::sampler::{run_round, RoundSpec};
use super::{
    DrawOrder, PayoutTable, SearchStrategy, SizeResult, SlipCandidate, ThresholdError,
    ThresholdTable, MIN_SLIP_SIZE,
};
use crate::config::{EngineConfig, SamplingConfig};
use crate::edge::EdgeProp;
use std::collections::HashSet;

/// Retained candidates per requested slip when exclusive legs thin the list
const EXCLUSIVE_RETENTION_FACTOR: usize = 20;

/// Number of k-subsets of n items, saturating
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result.saturating_mul((n - i) as u128) / (i as u128 + 1);
    }
    result
}

impl SearchStrategy {
    /// Pick the search strategy for a size and pool
    pub fn select(size: usize, pool_len: usize, exhaustive_limit: u64) -> Self {
        if size <= MIN_SLIP_SIZE || binomial(pool_len, size) <= u128::from(exhaustive_limit) {
            SearchStrategy::Exhaustive
        } else {
            SearchStrategy::MonteCarlo
        }
    }
}

/// Distinct players and enough distinct teams
pub(crate) fn is_legal(pool: &[EdgeProp], legs: &[usize], min_distinct_teams: usize) -> bool {
    for (i, &a) in legs.iter().enumerate() {
        if legs[i + 1..].iter().any(|&b| pool[a].player() == pool[b].player()) {
            return false;
        }
    }

    let mut teams: Vec<&str> = legs.iter().map(|&i| pool[i].team()).collect();
    teams.sort_unstable();
    teams.dedup();
    teams.len() >= min_distinct_teams
}

pub(crate) fn score(
    pool: &[EdgeProp],
    legs: Vec<usize>,
    breakeven_combined: f64,
    draw: DrawOrder,
) -> ScoredCombo {
    let combined_prob: f64 = legs.iter().map(|&i| pool[i].edge_prob).product();
    ScoredCombo {
        legs,
        combined_prob,
        combined_edge: combined_prob - breakeven_combined,
        draw,
    }
}

struct SearchOutput {
    top: TopN,
    evaluated: u64,
    legal: u64,
}

/// Builds ranked slips from a filtered pool
pub struct SlipCombinator<'a> {
    thresholds: &'a ThresholdTable,
    payouts: &'a PayoutTable,
    engine: &'a EngineConfig,
    sampling: &'a SamplingConfig,
}

impl<'a> SlipCombinator<'a> {
    /// Create a new combinator
    pub fn new(
        thresholds: &'a ThresholdTable,
        payouts: &'a PayoutTable,
        engine: &'a EngineConfig,
        sampling: &'a SamplingConfig,
    ) -> Self {
        Self {
            thresholds,
            payouts,
            engine,
            sampling,
        }
    }

    /// Top-ranked legal slips of one size
    ///
    /// `pool` is expected to be the filtered, sorted pool for `size`.
    pub fn build(&self, pool: &[EdgeProp], size: usize) -> Result<SizeResult, ThresholdError> {
        let breakeven = self
            .thresholds
            .breakeven_combined(size)
            .ok_or(ThresholdError::UnsupportedSize(size))?;

        if pool.len() < size {
            return Ok(SizeResult::empty(size, pool.len()));
        }

        let top_n = self.engine.top_n_per_size;
        let capacity = if self.engine.exclusive_legs {
            top_n.saturating_mul(EXCLUSIVE_RETENTION_FACTOR)
        } else {
            top_n
        };

        let strategy = SearchStrategy::select(size, pool.len(), self.sampling.exhaustive_limit);
        let output = match strategy {
            SearchStrategy::Exhaustive => self.enumerate(pool, size, breakeven, capacity),
            SearchStrategy::MonteCarlo => self.sample(pool, size, breakeven, capacity),
        };

        // Sampling completeness is judged before exclusivity thins the list
        let found = output.top.len();
        let mut slips: Vec<SlipCandidate> = output
            .top
            .into_sorted()
            .into_iter()
            .map(|combo| self.materialize(pool, size, combo))
            .collect();
        if self.engine.exclusive_legs {
            slips = retain_exclusive(slips);
        }
        slips.truncate(top_n);

        let partial = strategy == SearchStrategy::MonteCarlo && found < top_n;
        let exclusive_thinned = self.engine.exclusive_legs && slips.len() < found.min(top_n);

        tracing::debug!(
            size,
            %strategy,
            eligible = pool.len(),
            evaluated = output.evaluated,
            legal = output.legal,
            kept = slips.len(),
            partial,
            exclusive_thinned,
            "Slip search finished"
        );

        Ok(SizeResult {
            size,
            strategy,
            eligible: pool.len(),
            evaluated: output.evaluated,
            legal: output.legal,
            partial,
            exclusive_thinned,
            slips,
        })
    }

    /// Lexicographic enumeration of every k-subset
    fn enumerate(&self, pool: &[EdgeProp], size: usize, breakeven: f64, capacity: usize) -> SearchOutput {
        let n = pool.len();
        let mut top = TopN::new(capacity);
        let mut idx: Vec<usize> = (0..size).collect();
        let mut evaluated = 0u64;
        let mut legal = 0u64;

        loop {
            let draw = DrawOrder {
                round: 0,
                worker: 0,
                sample: evaluated,
            };
            evaluated += 1;

            if is_legal(pool, &idx, self.engine.min_distinct_teams) {
                legal += 1;
                top.offer(score(pool, idx.clone(), breakeven, draw));
            }

            let Some(i) = (0..size).rev().find(|&i| idx[i] < n - size + i) else {
                break;
            };
            idx[i] += 1;
            for j in i + 1..size {
                idx[j] = idx[j - 1] + 1;
            }
        }

        SearchOutput {
            top,
            evaluated,
            legal,
        }
    }

    /// Monte Carlo rounds until top-N is filled or rounds run out
    fn sample(&self, pool: &[EdgeProp], size: usize, breakeven: f64, capacity: usize) -> SearchOutput {
        let mut merged = TopN::new(capacity);
        let mut evaluated = 0u64;
        let mut legal = 0u64;

        for round in 0..self.sampling.max_sampling_rounds {
            let spec = RoundSpec {
                pool,
                size,
                min_distinct_teams: self.engine.min_distinct_teams,
                breakeven_combined: breakeven,
                capacity,
                seed: self.engine.random_seed,
                round,
                workers: self.sampling.workers.max(1),
                budget: self.sampling.budget_for(size),
            };

            for output in run_round(&spec) {
                evaluated += output.evaluated;
                legal += output.legal;
                merged.merge(output.top);
            }

            if merged.len() >= self.engine.top_n_per_size {
                break;
            }
            tracing::debug!(size, round, found = merged.len(), "Sampling round came up short");
        }

        SearchOutput {
            top: merged,
            evaluated,
            legal,
        }
    }

    fn materialize(&self, pool: &[EdgeProp], size: usize, combo: ScoredCombo) -> SlipCandidate {
        let legs: Vec<EdgeProp> = combo.legs.iter().map(|&i| pool[i].clone()).collect();
        let probs: Vec<f64> = legs.iter().map(|l| l.edge_prob).collect();
        let expected_return = self.payouts.expected_return(&probs).unwrap_or(f64::NAN);
        let teams = legs.iter().map(|l| l.team().to_string()).collect();

        SlipCandidate {
            size,
            legs,
            combined_prob: combo.combined_prob,
            combined_edge: combo.combined_edge,
            expected_return,
            teams,
            draw_order: combo.draw,
        }
    }
}

/// Keep slips whose props were not used by a better-ranked slip
fn retain_exclusive(slips: Vec<SlipCandidate>) -> Vec<SlipCandidate> {
    let mut used: HashSet<String> = HashSet::new();
    slips
        .into_iter()
        .filter(|slip| {
            let props: Vec<String> = slip.legs.iter().map(|l| l.prop.quote.prop_id()).collect();
            if props.iter().any(|p| used.contains(p)) {
                return false;
            }
            used.extend(props);
            true
        })
        .collect()
}
