//! Quote source integration tests

use prop_ev::config::Config;
use prop_ev::data::{source_for, CsvFileSource, DirectorySource, JsonFileSource, QuoteSource};
use prop_ev::engine::AnalysisEngine;
use tempfile::TempDir;

const ARRAY: &str = r#"[
    {"Player": "Josh Allen", "Team": "BUF - QB", "Prop Type": "Pass Yards",
     "FanDuel Line": "245.5", "FD Over Odds": "-115", "FD Under Odds": "-105",
     "PrizePicks Line": "245.5"},
    {"Player": "James Cook", "Team": "BUF - RB", "Prop Type": "Rush Yards",
     "FanDuel Line": "NL", "FD Over Odds": "NL", "FD Under Odds": "NL",
     "PrizePicks Line": "62.5"}
]"#;

const LINES: &str = concat!(
    r#"{"player":"Jalen Brunson","statistic":"Points","team":"NYK","sport":"NBA","over_price":"EVEN","under_price":-120,"reference_line":27.5,"fixed_line":27.5}"#,
    "\n"
);

const CSV: &str = "\
,Player,Team,Prop Type,FanDuel Line,FD Over Odds,FD Under Odds,PrizePicks Line
0,Stefon Diggs,BUF - WR,Receiving Yards,70.5,-115,-105,70.5
1,Dawson Knox,BUF - TE,Receptions,nan,nan,nan,3.5
2,Gabe Davis,BUF - WR
";

#[tokio::test]
async fn test_json_array_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nfl_sunday.json");
    std::fs::write(&path, ARRAY).unwrap();

    let batch = JsonFileSource::new(&path).load().await.unwrap();
    let records = &batch.records;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].team, "BUF");
    assert_eq!(records[0].position.as_deref(), Some("QB"));
    assert_eq!(records[0].sport.as_deref(), Some("NFL"));

    let (quote, _) = records[0].resolve().unwrap();
    assert_eq!(quote.sport, "NFL");
    assert!(records[1].resolve().is_err());
}

#[tokio::test]
async fn test_json_lines_file_keeps_explicit_sport() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nfl_misnamed.jsonl");
    std::fs::write(&path, LINES).unwrap();

    let batch = JsonFileSource::new(&path).load().await.unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.records[0].sport.as_deref(), Some("NBA"));
    let (quote, _) = batch.records[0].resolve().unwrap();
    assert_eq!(quote.over_price.value(), 100);
}

#[tokio::test]
async fn test_bad_records_do_not_drop_their_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tonight.json");
    std::fs::write(
        &path,
        r#"[
        {"player": "A", "statistic": "Points", "team": "BOS",
         "over_price": -200.0, "under_price": 160.0,
         "reference_line": 24.5, "fixed_line": 24.5},
        {"statistic": "Points", "team": "MIA", "over_price": -110},
        {"player": "B", "statistic": "Points", "team": "NYK",
         "over_price": -200, "under_price": 160,
         "reference_line": 24.5, "fixed_line": 24.5}
    ]"#,
    )
    .unwrap();

    let batch = JsonFileSource::new(&path).load().await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.malformed, 1);

    let report = AnalysisEngine::from_config(&Config::default())
        .unwrap()
        .run_batch(&batch);
    assert_eq!(report.stats.records, 3);
    assert_eq!(report.stats.malformed, 1);
    assert_eq!(report.stats.fair_props, 2);
    assert_eq!(report.size(2).unwrap().slips.len(), 1);
}

#[tokio::test]
async fn test_csv_file_with_scraper_headers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nfl_props.csv");
    std::fs::write(&path, CSV).unwrap();

    let batch = CsvFileSource::new(&path).load().await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.malformed, 1);

    let diggs = &batch.records[0];
    assert_eq!(diggs.team, "BUF");
    assert_eq!(diggs.position.as_deref(), Some("WR"));
    assert_eq!(diggs.sport.as_deref(), Some("NFL"));
    let (quote, fixed) = diggs.resolve().unwrap();
    assert_eq!(quote.over_price.value(), -115);
    assert_eq!(fixed.to_string(), "70.5");

    assert!(batch.records[1].resolve().is_err());

    let via_path = source_for(&path).load().await.unwrap();
    assert_eq!(via_path.len(), batch.len());
    assert_eq!(via_path.malformed, 1);
}

#[tokio::test]
async fn test_directory_skips_bad_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a_nfl.json"), ARRAY).unwrap();
    std::fs::write(dir.path().join("b_nba.jsonl"), LINES).unwrap();
    std::fs::write(dir.path().join("c_broken.json"), "[{not json").unwrap();
    std::fs::write(dir.path().join("d_nfl.csv"), CSV).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let batch = DirectorySource::new(dir.path()).load().await.unwrap();
    assert_eq!(batch.len(), 5);
    assert_eq!(batch.malformed, 1);
    assert_eq!(batch.records[0].player, "Josh Allen");
    assert_eq!(batch.records[2].player, "Jalen Brunson");
    assert_eq!(batch.records[3].player, "Stefon Diggs");

    let via_path = source_for(dir.path()).load().await.unwrap();
    let players = |b: &prop_ev::data::QuoteBatch| {
        b.records.iter().map(|r| r.player.clone()).collect::<Vec<_>>()
    };
    assert_eq!(players(&via_path), players(&batch));
    assert_eq!(via_path.malformed, batch.malformed);
}

#[tokio::test]
async fn test_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let result = JsonFileSource::new(dir.path().join("absent.json")).load().await;
    assert!(result.is_err());
}
