//! Result publishing integration tests

use prop_ev::config::Config;
use prop_ev::data::{QuoteRecord, RawLine, RawPrice, ResultPublisher, SlipTableReader};
use prop_ev::engine::{AnalysisEngine, AnalysisReport};
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn report() -> AnalysisReport {
    let mut config = Config::default();
    config.engine.slip_sizes = vec![2, 3];

    let teams = ["BOS", "NYK", "MIA"];
    let records: Vec<QuoteRecord> = (0..3)
        .map(|i| QuoteRecord {
            player: format!("Player {i}"),
            statistic: "Assists".to_string(),
            team: teams[i].to_string(),
            fixed_line: Some(RawLine::Number(dec!(6.5))),
            reference_line: Some(RawLine::Number(dec!(7.0))),
            over_price: Some(RawPrice::Number(-210)),
            under_price: Some(RawPrice::Number(170)),
            ..QuoteRecord::default()
        })
        .collect();

    AnalysisEngine::from_config(&config).unwrap().run(&records)
}

#[test]
fn test_publish_writes_tables_and_report() {
    let dir = TempDir::new().unwrap();
    let report = report();
    assert_eq!(report.size(2).unwrap().slips.len(), 3);
    assert_eq!(report.size(3).unwrap().slips.len(), 1);

    let files = ResultPublisher::new(dir.path()).publish(&report).unwrap();

    let sizes: Vec<usize> = files.slip_tables.iter().map(|(s, _)| *s).collect();
    assert_eq!(sizes, vec![2, 3]);
    for (size, path) in &files.slip_tables {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(&format!("slips_{size}leg_")));
        assert!(name.ends_with(".parquet"));
    }

    let three = SlipTableReader::new(&files.slip_tables[1].1).read().unwrap();
    assert_eq!(three.len(), 1);
    assert_eq!(three[0].rank, 1);
    assert_eq!(three[0].legs.len(), 3);
    assert_eq!(three[0].teams, vec!["BOS", "MIA", "NYK"]);
    assert_eq!(three[0].legs[0].fixed_line, dec!(6.5));
    assert_eq!(three[0].legs[0].reference_line, dec!(7.0));

    let json = std::fs::read_to_string(&files.report).unwrap();
    let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.run_id, report.run_id);
    assert_eq!(parsed.stats, report.stats);
}

#[test]
fn test_sizes_without_slips_write_no_table() {
    let dir = TempDir::new().unwrap();
    let mut report = report();
    report.sizes.retain(|r| r.size == 3);
    report.sizes[0].slips.clear();

    let files = ResultPublisher::new(dir.path()).publish(&report).unwrap();
    assert!(files.slip_tables.is_empty());
    assert!(files.report.exists());
}
