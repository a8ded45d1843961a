//! End-to-end integration tests

use prop_ev::config::Config;
use prop_ev::data::{JsonFileSource, QuoteSource, ResultPublisher, SlipTableReader};
use prop_ev::engine::AnalysisEngine;
use std::fmt::Write as _;
use tempfile::TempDir;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.engine.slip_sizes, vec![2, 3, 4, 5, 6]);
    assert_eq!(config.sampling.budget_for(5), 150_000);
    assert_eq!(config.sampling.budget_for(3), 200_000);
}

/// Twelve players on four teams, all with comparable lines
fn slate() -> String {
    let teams = ["BOS", "NYK", "MIA", "LAL"];
    let prices = [(-180, 145), (-165, 135), (-150, 120), (-145, 115), (-135, 110), (-125, 105)];
    let mut out = String::new();
    for i in 0..12 {
        let (over, under) = prices[i % prices.len()];
        writeln!(
            out,
            r#"{{"player":"Player {i}","statistic":"Points","team":"{} - F","over_price":{over},"under_price":{under},"reference_line":20.5,"fixed_line":"20.5"}}"#,
            teams[i % teams.len()]
        )
        .unwrap();
    }
    out.push_str(r#"{"player":"Scratch","statistic":"Points","team":"BOS","over_price":"NL","under_price":"NL","reference_line":"NL","fixed_line":20.5}"#);
    out.push('\n');
    out
}

#[tokio::test]
async fn test_quotes_to_published_tables() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("nba_tonight.jsonl");
    std::fs::write(&input, slate()).unwrap();

    let mut config = Config::default();
    config.engine.top_n_per_size = 5;
    config.sampling.workers = 2;
    config.sampling.default_sample_budget = 2_000;

    let batch = JsonFileSource::new(&input).load().await.unwrap();
    assert_eq!(batch.len(), 13);
    assert_eq!(batch.malformed, 0);
    assert_eq!(batch.records[0].team, "BOS");

    let engine = AnalysisEngine::from_config(&config).unwrap();
    let report = engine.run_batch(&batch);

    assert_eq!(report.stats.missing_reference, 1);
    assert_eq!(report.stats.fair_props, 12);
    assert_eq!(report.stats.edge_props, 24);

    let pairs = report.size(2).unwrap();
    assert_eq!(pairs.slips.len(), 5);
    for slip in &pairs.slips {
        assert!(slip.teams.len() >= 2);
        assert!(slip.legs.iter().all(|l| l.edge_prob >= 0.5773));
    }

    let out = dir.path().join("out");
    let files = ResultPublisher::new(&out).publish(&report).unwrap();
    assert!(files.report.exists());

    let (size, path) = &files.slip_tables[0];
    assert_eq!(*size, 2);
    let rows = SlipTableReader::new(path).read().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].legs.len(), 2);
    assert!((rows[0].combined_prob - pairs.slips[0].combined_prob).abs() < 1e-12);
}
