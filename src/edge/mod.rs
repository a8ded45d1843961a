//! Edge evaluation module
//!
//! Compares fixed-line props against fair reference probabilities

mod evaluator;
mod types;

pub use evaluator::{comparability, Comparability, EdgeEvaluator, Evaluation};
pub use types::{EdgeProp, FairProp, OddsQuote, PickSide};
