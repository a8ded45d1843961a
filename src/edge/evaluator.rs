//! Fixed-line vs reference-line edge evaluation

use super::{EdgeProp, FairProp, PickSide};
use crate::config::EngineConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Line increment the adjustment factor is expressed in
const HALF_POINT: Decimal = dec!(0.5);

/// Probabilities are kept strictly inside (0, 1)
const PROB_FLOOR: f64 = 1e-6;

/// Whether two lines describe the same market
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparability {
    /// Gap within tolerance
    Comparable { line_delta: Decimal },
    /// Gap exceeds tolerance
    Incomparable { line_delta: Decimal },
}

impl Comparability {
    pub fn is_comparable(&self) -> bool {
        matches!(self, Comparability::Comparable { .. })
    }

    pub fn line_delta(&self) -> Decimal {
        match self {
            Comparability::Comparable { line_delta } | Comparability::Incomparable { line_delta } => {
                *line_delta
            }
        }
    }
}

/// Compare a fixed line against a reference line
///
/// Only the absolute gap decides, so swapping the two lines flips the sign
/// of the delta and nothing else.
pub fn comparability(fixed_line: Decimal, reference_line: Decimal, tolerance: Decimal) -> Comparability {
    let line_delta = fixed_line - reference_line;
    if line_delta.abs() > tolerance {
        Comparability::Incomparable { line_delta }
    } else {
        Comparability::Comparable { line_delta }
    }
}

/// Outcome of evaluating one prop
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Over and under candidates
    Comparable(Vec<EdgeProp>),
    /// Lines too far apart to compare
    Incomparable { line_delta: Decimal },
}

/// Turns fair props into candidate legs
#[derive(Debug, Clone)]
pub struct EdgeEvaluator {
    line_tolerance: Decimal,
    adjustment_factor: f64,
}

impl EdgeEvaluator {
    /// Create a new evaluator
    ///
    /// `adjustment_factor` is the probability shift applied per half point
    /// of gap between the fixed and reference lines.
    pub fn new(line_tolerance: Decimal, adjustment_factor: f64) -> Self {
        Self {
            line_tolerance,
            adjustment_factor,
        }
    }

    /// Create from EngineConfig
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.line_tolerance, config.line_adjustment_factor)
    }

    /// Evaluate both sides of a prop at the fixed line
    pub fn evaluate(&self, prop: &FairProp, fixed_line: Decimal) -> Evaluation {
        let line_delta = match comparability(fixed_line, prop.quote.line_value, self.line_tolerance) {
            Comparability::Comparable { line_delta } => line_delta,
            Comparability::Incomparable { line_delta } => {
                tracing::trace!(
                    player = %prop.quote.player,
                    statistic = %prop.quote.statistic,
                    %line_delta,
                    "Lines not comparable"
                );
                return Evaluation::Incomparable { line_delta };
            }
        };

        let legs = [PickSide::Over, PickSide::Under]
            .into_iter()
            .map(|side| EdgeProp {
                prop: prop.clone(),
                fixed_line,
                pick_side: side,
                edge_prob: self.adjusted_prob(prop.fair_prob(side), side, line_delta),
                line_delta,
            })
            .collect();

        Evaluation::Comparable(legs)
    }

    /// Shift a fair probability by the line gap
    ///
    /// A fixed line below the reference favors the over; above favors the under.
    fn adjusted_prob(&self, fair_prob: f64, side: PickSide, line_delta: Decimal) -> f64 {
        if line_delta.is_zero() || self.adjustment_factor == 0.0 {
            return fair_prob;
        }

        let steps = (line_delta.abs() / HALF_POINT).to_f64().unwrap_or(0.0);
        let favored = if line_delta.is_sign_negative() {
            PickSide::Over
        } else {
            PickSide::Under
        };
        let shift = self.adjustment_factor * steps;
        let adjusted = if side == favored {
            fair_prob + shift
        } else {
            fair_prob - shift
        };

        adjusted.clamp(PROB_FLOOR, 1.0 - PROB_FLOOR)
    }
}

impl Default for EdgeEvaluator {
    fn default() -> Self {
        Self::new(HALF_POINT, 0.0)
    }
}
