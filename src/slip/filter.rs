//! Pool filtering

use super::{ThresholdError, ThresholdTable};
use crate::edge::EdgeProp;
use std::cmp::Ordering;

/// Selects legs that clear a slip size's per-leg threshold
pub struct PoolFilter<'a> {
    thresholds: &'a ThresholdTable,
}

impl<'a> PoolFilter<'a> {
    /// Create a new pool filter
    pub fn new(thresholds: &'a ThresholdTable) -> Self {
        Self { thresholds }
    }

    /// Legs eligible for `size`-leg slips, best first
    pub fn filter(&self, pool: &[EdgeProp], size: usize) -> Result<Vec<EdgeProp>, ThresholdError> {
        let threshold = self
            .thresholds
            .per_leg(size)
            .ok_or(ThresholdError::UnsupportedSize(size))?;
        Ok(filter_by_threshold(pool, threshold))
    }
}

/// Keep legs with `edge_prob >= threshold`, sorted by descending probability
///
/// Ties fall back to player, statistic and side so the order never depends
/// on input order.
pub fn filter_by_threshold(pool: &[EdgeProp], threshold: f64) -> Vec<EdgeProp> {
    let mut eligible: Vec<EdgeProp> = pool
        .iter()
        .filter(|leg| leg.edge_prob >= threshold)
        .cloned()
        .collect();
    eligible.sort_by(leg_order);
    eligible
}

pub(crate) fn leg_order(a: &EdgeProp, b: &EdgeProp) -> Ordering {
    b.edge_prob
        .total_cmp(&a.edge_prob)
        .then_with(|| a.player().cmp(b.player()))
        .then_with(|| a.statistic().cmp(b.statistic()))
        .then_with(|| a.pick_side.cmp(&b.pick_side))
        .then_with(|| a.fixed_line.cmp(&b.fixed_line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{FairProp, OddsQuote, PickSide};
    use crate::odds::AmericanPrice;
    use crate::slip::PayoutTable;
    use rust_decimal_macros::dec;

    fn make_leg(player: &str, prob: f64) -> EdgeProp {
        EdgeProp {
            prop: FairProp {
                quote: OddsQuote {
                    player: player.to_string(),
                    statistic: "Points".to_string(),
                    sport: "NBA".to_string(),
                    team: format!("{player}-team"),
                    opponent: None,
                    position: None,
                    line_value: dec!(24.5),
                    over_price: AmericanPrice::new(-130).unwrap(),
                    under_price: AmericanPrice::new(100).unwrap(),
                },
                fair_over_prob: prob,
                fair_under_prob: 1.0 - prob,
                overround: 1.05,
            },
            fixed_line: dec!(24.5),
            pick_side: PickSide::Over,
            edge_prob: prob,
            line_delta: dec!(0),
        }
    }

    fn default_table() -> ThresholdTable {
        ThresholdTable::derive(&PayoutTable::for_style(Default::default())).unwrap()
    }

    #[test]
    fn test_six_leg_threshold_admits_58_percent() {
        let table = default_table();
        let filter = PoolFilter::new(&table);
        let pool = vec![make_leg("A", 0.58), make_leg("B", 0.53)];

        let eligible = filter.filter(&pool, 6).unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].player(), "A");
    }

    #[test]
    fn test_sorted_descending() {
        let pool = vec![
            make_leg("A", 0.56),
            make_leg("B", 0.61),
            make_leg("C", 0.58),
        ];
        let eligible = filter_by_threshold(&pool, 0.55);
        let probs: Vec<f64> = eligible.iter().map(|l| l.edge_prob).collect();
        assert_eq!(probs, vec![0.61, 0.58, 0.56]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let pool = vec![make_leg("A", 0.55)];
        assert_eq!(filter_by_threshold(&pool, 0.55).len(), 1);
    }

    #[test]
    fn test_refilter_is_idempotent() {
        let pool = vec![
            make_leg("D", 0.57),
            make_leg("A", 0.60),
            make_leg("C", 0.54),
            make_leg("B", 0.57),
        ];
        let once = filter_by_threshold(&pool, 0.55);
        let twice = filter_by_threshold(&once, 0.55);
        assert_eq!(once, twice);

        let mut reversed = pool.clone();
        reversed.reverse();
        assert_eq!(filter_by_threshold(&reversed, 0.55), once);
    }

    #[test]
    fn test_unknown_size_rejected() {
        let table = ThresholdTable::derive(&PayoutTable::flex()).unwrap();
        let filter = PoolFilter::new(&table);
        assert_eq!(
            filter.filter(&[], 2),
            Err(ThresholdError::UnsupportedSize(2))
        );
    }
}
