//! Slip generation module
//!
//! Break-even thresholds, pool filtering and the combinatorial search that
//! assembles ranked multi-leg slips

mod combinator;
mod filter;
mod ranking;
mod sampler;
mod threshold;
mod types;

pub use combinator::{binomial, SlipCombinator};
pub use filter::{filter_by_threshold, PoolFilter};
pub use sampler::stream_seed;
pub use threshold::{
    breakeven_per_leg, hit_distribution, PayoutSchedule, PayoutStyle, PayoutTable, PayoutTier,
    SizeThreshold, ThresholdError, ThresholdTable, MAX_SLIP_SIZE, MIN_SLIP_SIZE,
};
pub use types::{rank_cmp, DrawOrder, SearchStrategy, SizeResult, SlipCandidate};
