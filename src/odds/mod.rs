//! Fair odds module
//!
//! Removes the bookmaker margin from two-sided American odds

mod american;
mod novig;
mod types;

pub use american::AmericanPrice;
pub use novig::{no_vig, NoVigModel, NORMALIZATION_TOLERANCE};
pub use types::{FairProbs, OddsError};

/// Trait for vig removal implementations
pub trait FairOddsModel: Send + Sync {
    /// Convert an over/under price pair into fair win probabilities
    fn fair_probs(&self, over: AmericanPrice, under: AmericanPrice)
        -> Result<FairProbs, OddsError>;
}
