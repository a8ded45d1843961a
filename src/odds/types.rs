//! Fair odds types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while converting odds
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OddsError {
    /// Zero or unparseable price
    #[error("Invalid American odds: {0}")]
    InvalidOdds(String),
    /// Normalized pair failed the sum-to-one check
    #[error("Fair probabilities failed normalization: over={over}, under={under}")]
    NormalizationFailed { over: f64, under: f64 },
}

/// Vig-free probability pair for a two-way market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairProbs {
    /// Fair probability of the over
    pub over: f64,
    /// Fair probability of the under
    pub under: f64,
    /// Sum of the raw implied probabilities
    pub overround: f64,
}

impl FairProbs {
    /// Bookmaker margin (overround above 1.0)
    pub fn vig(&self) -> f64 {
        self.overround - 1.0
    }
}
