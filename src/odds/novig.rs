//! Multiplicative vig removal
//!
//! Each side's implied probability is divided by the overround so the
//! pair sums to one.

use super::{AmericanPrice, FairOddsModel, FairProbs, OddsError};

/// Allowed drift of the normalized pair from 1.0
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// No-vig fair odds model
pub struct NoVigModel;

impl NoVigModel {
    /// Create a new no-vig model
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoVigModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FairOddsModel for NoVigModel {
    fn fair_probs(
        &self,
        over: AmericanPrice,
        under: AmericanPrice,
    ) -> Result<FairProbs, OddsError> {
        let implied_over = over.implied_probability();
        let implied_under = under.implied_probability();
        let overround = implied_over + implied_under;

        let fair = FairProbs {
            over: implied_over / overround,
            under: implied_under / overround,
            overround,
        };

        let in_range = |p: f64| p > 0.0 && p < 1.0;
        if !in_range(fair.over)
            || !in_range(fair.under)
            || (fair.over + fair.under - 1.0).abs() > NORMALIZATION_TOLERANCE
        {
            return Err(OddsError::NormalizationFailed {
                over: fair.over,
                under: fair.under,
            });
        }

        Ok(fair)
    }
}

/// Convenience conversion from raw integer prices
pub fn no_vig(over: i32, under: i32) -> Result<FairProbs, OddsError> {
    NoVigModel.fair_probs(AmericanPrice::new(over)?, AmericanPrice::new(under)?)
}
