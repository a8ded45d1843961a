//! Quote record input
//!
//! Records arrive as JSON arrays, JSON lines or scraper CSV exports. Field
//! names follow either the crate's snake_case form or the scraper's column
//! headers. A record that fails to parse is counted and skipped; the rest of
//! its file still loads.

use crate::edge::OddsQuote;
use crate::odds::{AmericanPrice, OddsError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Sport assumed when neither the record nor its file name says otherwise
pub const DEFAULT_SPORT: &str = "NBA";

/// Placeholders scrapers emit for an absent line or price
const MISSING_MARKERS: [&str; 5] = ["", "NL", "FF", "nan", "None"];

/// Price as it appears in input: a number or text such as "-120" or "EVEN"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(i64),
    /// Whole prices written as floats, or NaN for an empty cell
    Float(f64),
    Text(String),
}

/// Line as it appears in input: a number or text such as "24.5" or "NL"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLine {
    Number(Decimal),
    /// Non-finite floats that `Decimal` rejects
    Float(f64),
    Text(String),
}

/// One row of input: a reference quote joined with the fixed-product line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    #[serde(alias = "Player")]
    pub player: String,
    #[serde(alias = "Prop Type")]
    pub statistic: String,
    #[serde(default, alias = "Sport")]
    pub sport: Option<String>,
    #[serde(default, alias = "Team")]
    pub team: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, alias = "Opponent")]
    pub opponent: Option<String>,
    #[serde(default, alias = "PrizePicks Line")]
    pub fixed_line: Option<RawLine>,
    #[serde(default, alias = "FanDuel Line")]
    pub reference_line: Option<RawLine>,
    #[serde(default, alias = "FD Over Odds")]
    pub over_price: Option<RawPrice>,
    #[serde(default, alias = "FD Under Odds")]
    pub under_price: Option<RawPrice>,
}

/// Why a record produced no quote
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordIssue {
    #[error("reference line or price missing")]
    MissingReference,
    #[error("fixed line missing")]
    MissingFixedLine,
    #[error(transparent)]
    InvalidOdds(#[from] OddsError),
}

fn is_missing(text: &str) -> bool {
    let text = text.trim();
    MISSING_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(text))
}

impl RawPrice {
    /// `None` for a missing marker
    pub fn parse(&self) -> Result<Option<AmericanPrice>, OddsError> {
        match self {
            RawPrice::Number(value) => AmericanPrice::try_from(*value).map(Some),
            RawPrice::Float(value) if value.is_nan() => Ok(None),
            RawPrice::Float(value) => AmericanPrice::try_from(*value).map(Some),
            RawPrice::Text(text) if is_missing(text) => Ok(None),
            RawPrice::Text(text) => AmericanPrice::from_str(text.trim()).map(Some),
        }
    }
}

impl RawLine {
    /// `None` for a missing or unparseable line
    pub fn parse(&self) -> Option<Decimal> {
        match self {
            RawLine::Number(value) => Some(*value),
            RawLine::Float(value) => Decimal::try_from(*value).ok(),
            RawLine::Text(text) if is_missing(text) => None,
            RawLine::Text(text) => Decimal::from_str(text.trim()).ok(),
        }
    }
}

impl QuoteRecord {
    /// Split "LAL - G" team strings and fill the sport from a hint
    pub fn normalize(&mut self, sport_hint: Option<&str>) {
        if let Some((team, position)) = self.team.split_once(" - ") {
            if self.position.is_none() && !position.trim().is_empty() {
                self.position = Some(position.trim().to_string());
            }
            self.team = team.trim().to_string();
        }
        if self.sport.is_none() {
            self.sport = sport_hint.map(str::to_string);
        }
    }

    /// Key the scraper deduplicates on
    pub fn dedup_key(&self) -> (String, String, String, String) {
        (
            self.player.clone(),
            self.team.clone(),
            self.sport.clone().unwrap_or_default(),
            self.statistic.clone(),
        )
    }

    /// Reference quote and fixed line, or why there is none
    pub fn resolve(&self) -> Result<(OddsQuote, Decimal), RecordIssue> {
        let over = self.over_price.as_ref().map(RawPrice::parse).transpose()?.flatten();
        let under = self.under_price.as_ref().map(RawPrice::parse).transpose()?.flatten();
        let reference = self.reference_line.as_ref().and_then(RawLine::parse);

        let (Some(over_price), Some(under_price), Some(line_value)) = (over, under, reference)
        else {
            return Err(RecordIssue::MissingReference);
        };
        let fixed_line = self
            .fixed_line
            .as_ref()
            .and_then(RawLine::parse)
            .ok_or(RecordIssue::MissingFixedLine)?;

        let quote = OddsQuote {
            player: self.player.clone(),
            statistic: self.statistic.clone(),
            sport: self
                .sport
                .clone()
                .unwrap_or_else(|| DEFAULT_SPORT.to_string()),
            team: self.team.clone(),
            opponent: self.opponent.clone(),
            position: self.position.clone(),
            line_value,
            over_price,
            under_price,
        };
        Ok((quote, fixed_line))
    }
}

/// Sport implied by a file name (`nfl` anywhere selects NFL)
pub fn sport_from_path(path: &Path) -> &'static str {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.contains("nfl") {
        "NFL"
    } else {
        DEFAULT_SPORT
    }
}

/// Records read from an input, plus how many entries could not be read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteBatch {
    pub records: Vec<QuoteRecord>,
    /// Entries that were not valid JSON or CSV, or lacked a player or statistic
    pub malformed: usize,
}

impl QuoteBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append another batch, summing malformed counts
    pub fn extend(&mut self, other: QuoteBatch) {
        self.records.extend(other.records);
        self.malformed += other.malformed;
    }

    fn accept<E: fmt::Display>(&mut self, parsed: Result<QuoteRecord, E>, location: usize) {
        match parsed {
            Ok(record) => self.records.push(record),
            Err(e) => {
                tracing::warn!(location, error = %e, "Skipping malformed quote record");
                self.malformed += 1;
            }
        }
    }

    fn normalize(&mut self, sport_hint: Option<&str>) {
        for record in &mut self.records {
            record.normalize(sport_hint);
        }
    }
}

/// Parse a JSON array or JSON-lines document
///
/// Each array element or line is read on its own. Only a document that is
/// not a JSON array at all fails as a whole.
pub fn parse_records(content: &str) -> anyhow::Result<QuoteBatch> {
    let mut batch = QuoteBatch::default();
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(batch);
    }

    if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
        for (i, value) in values.into_iter().enumerate() {
            batch.accept(serde_json::from_value::<QuoteRecord>(value), i);
        }
        return Ok(batch);
    }

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        batch.accept(serde_json::from_str::<QuoteRecord>(line), i + 1);
    }
    Ok(batch)
}

/// Parse a CSV export with a header row
///
/// Rows are matched to fields by header name; extra columns are ignored.
pub fn parse_csv_records(content: &str) -> QuoteBatch {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut batch = QuoteBatch::default();
    for (i, row) in reader.deserialize::<QuoteRecord>().enumerate() {
        // Data starts on line 2
        batch.accept(row, i + 2);
    }
    batch
}

/// Trait for quote record inputs
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Load every readable record
    async fn load(&self) -> anyhow::Result<QuoteBatch>;
}

async fn read_quote_file(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

/// Records from one JSON or JSON-lines file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a new file source
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuoteSource for JsonFileSource {
    async fn load(&self) -> anyhow::Result<QuoteBatch> {
        let content = read_quote_file(&self.path).await?;
        let mut batch = parse_records(&content)
            .map_err(|e| anyhow::anyhow!("Invalid JSON in {}: {}", self.path.display(), e))?;
        batch.normalize(Some(sport_from_path(&self.path)));

        tracing::debug!(
            path = %self.path.display(),
            count = batch.len(),
            malformed = batch.malformed,
            "Loaded quote records"
        );
        Ok(batch)
    }
}

/// Records from one scraper CSV export
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuoteSource for CsvFileSource {
    async fn load(&self) -> anyhow::Result<QuoteBatch> {
        let content = read_quote_file(&self.path).await?;
        let mut batch = parse_csv_records(&content);
        batch.normalize(Some(sport_from_path(&self.path)));

        tracing::debug!(
            path = %self.path.display(),
            count = batch.len(),
            malformed = batch.malformed,
            "Loaded CSV quote records"
        );
        Ok(batch)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn is_quote_file(path: &Path) -> bool {
    is_csv(path)
        || path
            .extension()
            .is_some_and(|ext| ext == "json" || ext == "jsonl")
}

/// Source for a single file, chosen by extension
pub fn file_source(path: &Path) -> Box<dyn QuoteSource> {
    if is_csv(path) {
        Box::new(CsvFileSource::new(path))
    } else {
        Box::new(JsonFileSource::new(path))
    }
}

/// Records from every `.json`, `.jsonl` and `.csv` file in a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Create a new directory source
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", self.dir.display(), e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_quote_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl QuoteSource for DirectorySource {
    async fn load(&self) -> anyhow::Result<QuoteBatch> {
        let mut batch = QuoteBatch::default();
        for path in self.files().await? {
            match file_source(&path).load().await {
                Ok(loaded) => batch.extend(loaded),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable quote file"),
            }
        }
        Ok(batch)
    }
}

/// Source for a path: a directory of files or a single file
pub fn source_for(path: &Path) -> Box<dyn QuoteSource> {
    if path.is_dir() {
        Box::new(DirectorySource::new(path))
    } else {
        file_source(path)
    }
}
