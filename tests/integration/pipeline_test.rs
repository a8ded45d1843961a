//! Pipeline integration tests

use prop_ev::config::{Config, EngineConfig, SamplingConfig};
use prop_ev::data::{QuoteRecord, RawLine, RawPrice};
use prop_ev::edge::{comparability, EdgeEvaluator, EdgeProp, Evaluation, FairProp, OddsQuote, PickSide};
use prop_ev::engine::{AnalysisEngine, EngineWarning};
use prop_ev::odds::{no_vig, AmericanPrice, NoVigModel};
use prop_ev::slip::{PayoutTable, PoolFilter, SearchStrategy, SlipCombinator, ThresholdTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn quote(player: &str, team: &str, line: Decimal, over: i32, under: i32) -> OddsQuote {
    OddsQuote {
        player: player.to_string(),
        statistic: "Points".to_string(),
        sport: "NBA".to_string(),
        team: team.to_string(),
        opponent: None,
        position: None,
        line_value: line,
        over_price: AmericanPrice::new(over).unwrap(),
        under_price: AmericanPrice::new(under).unwrap(),
    }
}

fn leg_with_prob(player: &str, team: &str, prob: f64) -> EdgeProp {
    let prop = FairProp {
        quote: quote(player, team, dec!(24.5), -140, 120),
        fair_over_prob: prob,
        fair_under_prob: 1.0 - prob,
        overround: 1.04,
    };
    EdgeProp {
        prop,
        fixed_line: dec!(24.5),
        pick_side: PickSide::Over,
        edge_prob: prob,
        line_delta: dec!(0),
    }
}

fn record(player: &str, team: &str, over: i64, under: i64) -> QuoteRecord {
    QuoteRecord {
        player: player.to_string(),
        statistic: "Rebounds".to_string(),
        team: team.to_string(),
        fixed_line: Some(RawLine::Number(dec!(8.5))),
        reference_line: Some(RawLine::Number(dec!(8.5))),
        over_price: Some(RawPrice::Number(over)),
        under_price: Some(RawPrice::Number(under)),
        ..QuoteRecord::default()
    }
}

#[test]
fn test_minus_120_even_fair_pair() {
    let fair = no_vig(-120, 100).unwrap();
    assert!((fair.over - 0.5217).abs() < 1e-4);
    assert!((fair.under - 0.4783).abs() < 1e-4);
    assert!((fair.over + fair.under - 1.0).abs() < 1e-9);
}

#[test]
fn test_equal_lines_at_058_pass_six_leg_threshold() {
    let payouts = PayoutTable::for_style(Default::default());
    let thresholds = ThresholdTable::derive(&payouts).unwrap();
    let filter = PoolFilter::new(&thresholds);

    let pool = vec![leg_with_prob("A", "BOS", 0.58)];
    assert_eq!(filter.filter(&pool, 6).unwrap().len(), 1);
    assert!((thresholds.per_leg(6).unwrap() - 0.5421).abs() < 1e-3);
    assert!(filter.filter(&pool, 2).unwrap().is_empty());
}

#[test]
fn test_line_gap_beyond_tolerance_yields_no_legs() {
    let evaluator = EdgeEvaluator::new(dec!(0.5), 0.0);
    let fair = FairProp::from_quote(quote("A", "BOS", dec!(26.0), -120, 100), &NoVigModel::new()).unwrap();
    assert!(matches!(
        evaluator.evaluate(&fair, dec!(24.5)),
        Evaluation::Incomparable { .. }
    ));
    assert_eq!(
        comparability(dec!(24.5), dec!(26.0), dec!(0.5)).is_comparable(),
        comparability(dec!(26.0), dec!(24.5), dec!(0.5)).is_comparable()
    );
}

#[test]
fn test_four_distinct_props_make_six_ranked_pairs() {
    let payouts = PayoutTable::for_style(Default::default());
    let thresholds = ThresholdTable::derive(&payouts).unwrap();
    let engine = EngineConfig::default();
    let sampling = SamplingConfig::default();
    let combinator = SlipCombinator::new(&thresholds, &payouts, &engine, &sampling);
    let filter = PoolFilter::new(&thresholds);

    let pool = filter
        .filter(
            &[
                leg_with_prob("A", "BOS", 0.60),
                leg_with_prob("B", "NYK", 0.63),
                leg_with_prob("C", "MIA", 0.59),
                leg_with_prob("D", "LAL", 0.61),
            ],
            2,
        )
        .unwrap();
    let result = combinator.build(&pool, 2).unwrap();

    assert_eq!(result.slips.len(), 6);
    let probs: Vec<f64> = result.slips.iter().map(|s| s.combined_prob).collect();
    let mut sorted = probs.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(probs, sorted);
}

#[test]
fn test_same_seed_same_slips() {
    let mut config = Config::default();
    config.engine.slip_sizes = vec![5, 6];
    config.sampling.exhaustive_limit = 100;
    config.sampling.default_sample_budget = 3_000;

    let teams = ["BOS", "NYK", "MIA", "LAL", "DEN"];
    let records: Vec<QuoteRecord> = (0..20)
        .map(|i| record(&format!("Player {i}"), teams[i % teams.len()], -150 - (i as i64 % 5) * 10, 125))
        .collect();

    let engine = AnalysisEngine::from_config(&config).unwrap();
    let first = engine.run(&records);
    let second = engine.run(&records);

    assert_eq!(first.sizes, second.sizes);
    let six = first.size(6).unwrap();
    assert_eq!(six.strategy, SearchStrategy::MonteCarlo);
    for slip in &six.slips {
        let mut players = slip.players();
        players.sort_unstable();
        players.dedup();
        assert_eq!(players.len(), 6);
        assert!(slip.teams.len() >= 2);
    }
}

#[test]
fn test_single_team_pool_reports_partial() {
    let mut config = Config::default();
    config.engine.slip_sizes = vec![3];
    config.engine.min_distinct_teams = 2;
    config.sampling.exhaustive_limit = 0;
    config.sampling.default_sample_budget = 500;

    let records: Vec<QuoteRecord> = (0..8)
        .map(|i| record(&format!("Player {i}"), "BOS", -170, 140))
        .collect();

    let engine = AnalysisEngine::from_config(&config).unwrap();
    let report = engine.run(&records);

    let three = report.size(3).unwrap();
    assert!(three.slips.is_empty());
    assert!(three.partial);
    assert_eq!(three.legal, 0);
    assert!(report.warnings.contains(&EngineWarning::SamplingBudgetExhausted {
        size: 3,
        found: 0,
        wanted: 10
    }));
}
