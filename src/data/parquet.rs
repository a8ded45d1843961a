//! Parquet slip tables
//!
//! One row per leg; slip-level columns repeat on each of a slip's legs.

use super::publisher::{LegRow, SlipRow};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Separator for the team list column
const TEAM_SEPARATOR: &str = "|";

/// Slip leg schema fields
pub fn slip_leg_schema() -> Schema {
    Schema::new(vec![
        Field::new("rank", DataType::UInt32, false),
        Field::new("size", DataType::UInt32, false),
        Field::new("combined_prob", DataType::Float64, false),
        Field::new("combined_edge", DataType::Float64, false),
        Field::new("expected_return", DataType::Float64, false),
        Field::new("teams", DataType::Utf8, false),
        Field::new("leg_index", DataType::UInt32, false),
        Field::new("player", DataType::Utf8, false),
        Field::new("team", DataType::Utf8, false),
        Field::new("statistic", DataType::Utf8, false),
        Field::new("side", DataType::Utf8, false),
        Field::new("fixed_line", DataType::Utf8, false), // Store as string for Decimal precision
        Field::new("reference_line", DataType::Utf8, false),
        Field::new("edge_prob", DataType::Float64, false),
    ])
}

/// Writes ranked slips for one size to Parquet
pub struct SlipTableWriter {
    output_dir: PathBuf,
}

impl SlipTableWriter {
    /// Create a new slip table writer
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// File path for a slip size at a timestamp
    pub fn file_path(&self, size: usize, timestamp: DateTime<Utc>) -> PathBuf {
        let filename = format!(
            "slips_{}leg_{}.parquet",
            size,
            timestamp.format("%Y%m%d_%H%M%S")
        );
        self.output_dir.join(filename)
    }

    /// Write slips to a Parquet file; nothing is written for an empty list
    pub fn write(&self, path: &Path, slips: &[SlipRow]) -> anyhow::Result<()> {
        if slips.is_empty() {
            return Ok(());
        }

        self.ensure_dir()?;

        let schema = Arc::new(slip_leg_schema());
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        let legs: Vec<(&SlipRow, &LegRow)> = slips
            .iter()
            .flat_map(|slip| slip.legs.iter().map(move |leg| (slip, leg)))
            .collect();
        let teams: Vec<String> = legs
            .iter()
            .map(|(slip, _)| slip.teams.join(TEAM_SEPARATOR))
            .collect();
        let fixed_lines: Vec<String> = legs.iter().map(|(_, l)| l.fixed_line.to_string()).collect();
        let reference_lines: Vec<String> =
            legs.iter().map(|(_, l)| l.reference_line.to_string()).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from_iter_values(legs.iter().map(|(s, _)| s.rank))),
            Arc::new(UInt32Array::from_iter_values(legs.iter().map(|(s, _)| s.size as u32))),
            Arc::new(Float64Array::from_iter_values(legs.iter().map(|(s, _)| s.combined_prob))),
            Arc::new(Float64Array::from_iter_values(legs.iter().map(|(s, _)| s.combined_edge))),
            Arc::new(Float64Array::from_iter_values(legs.iter().map(|(s, _)| s.expected_return))),
            Arc::new(StringArray::from_iter_values(teams.iter())),
            Arc::new(UInt32Array::from_iter_values(legs.iter().map(|(_, l)| l.leg_index))),
            Arc::new(StringArray::from_iter_values(legs.iter().map(|(_, l)| l.player.as_str()))),
            Arc::new(StringArray::from_iter_values(legs.iter().map(|(_, l)| l.team.as_str()))),
            Arc::new(StringArray::from_iter_values(legs.iter().map(|(_, l)| l.statistic.as_str()))),
            Arc::new(StringArray::from_iter_values(legs.iter().map(|(_, l)| l.side.as_str()))),
            Arc::new(StringArray::from_iter_values(fixed_lines.iter())),
            Arc::new(StringArray::from_iter_values(reference_lines.iter())),
            Arc::new(Float64Array::from_iter_values(legs.iter().map(|(_, l)| l.edge_prob))),
        ];

        let batch = RecordBatch::try_new(schema, columns)?;

        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, slips = slips.len(), legs = legs.len(), "Wrote slips to Parquet");

        Ok(())
    }
}

/// Reader for published slip tables
pub struct SlipTableReader {
    path: PathBuf,
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> anyhow::Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| anyhow::anyhow!("Invalid {} column", name))
}

impl SlipTableReader {
    /// Create a new reader for a Parquet file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read slips back, regrouped by rank
    pub fn read(&self) -> anyhow::Result<Vec<SlipRow>> {
        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let reader = builder.build()?;

        let mut slips: Vec<SlipRow> = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;

            let ranks = column::<UInt32Array>(&batch, "rank")?;
            let sizes = column::<UInt32Array>(&batch, "size")?;
            let combined_probs = column::<Float64Array>(&batch, "combined_prob")?;
            let combined_edges = column::<Float64Array>(&batch, "combined_edge")?;
            let expected_returns = column::<Float64Array>(&batch, "expected_return")?;
            let teams = column::<StringArray>(&batch, "teams")?;
            let leg_indexes = column::<UInt32Array>(&batch, "leg_index")?;
            let players = column::<StringArray>(&batch, "player")?;
            let leg_teams = column::<StringArray>(&batch, "team")?;
            let statistics = column::<StringArray>(&batch, "statistic")?;
            let sides = column::<StringArray>(&batch, "side")?;
            let fixed_lines = column::<StringArray>(&batch, "fixed_line")?;
            let reference_lines = column::<StringArray>(&batch, "reference_line")?;
            let edge_probs = column::<Float64Array>(&batch, "edge_prob")?;

            for i in 0..batch.num_rows() {
                let leg = LegRow {
                    leg_index: leg_indexes.value(i),
                    player: players.value(i).to_string(),
                    team: leg_teams.value(i).to_string(),
                    statistic: statistics.value(i).to_string(),
                    side: sides.value(i).to_string(),
                    fixed_line: Decimal::from_str(fixed_lines.value(i))?,
                    reference_line: Decimal::from_str(reference_lines.value(i))?,
                    edge_prob: edge_probs.value(i),
                };

                let rank = ranks.value(i);
                match slips.last_mut() {
                    Some(slip) if slip.rank == rank => slip.legs.push(leg),
                    _ => slips.push(SlipRow {
                        rank,
                        size: sizes.value(i) as usize,
                        combined_prob: combined_probs.value(i),
                        combined_edge: combined_edges.value(i),
                        expected_return: expected_returns.value(i),
                        teams: teams
                            .value(i)
                            .split(TEAM_SEPARATOR)
                            .filter(|t| !t.is_empty())
                            .map(str::to_string)
                            .collect(),
                        legs: vec![leg],
                    }),
                }
            }
        }

        Ok(slips)
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn leg(index: u32, player: &str, team: &str) -> LegRow {
        LegRow {
            leg_index: index,
            player: player.to_string(),
            team: team.to_string(),
            statistic: "Points".to_string(),
            side: "OVER".to_string(),
            fixed_line: dec!(24.5),
            reference_line: dec!(25.0),
            edge_prob: 0.6,
        }
    }

    fn slip(rank: u32) -> SlipRow {
        SlipRow {
            rank,
            size: 2,
            combined_prob: 0.36,
            combined_edge: 0.0267,
            expected_return: 0.08,
            teams: vec!["BOS".to_string(), "NYK".to_string()],
            legs: vec![leg(0, "A", "BOS"), leg(1, &format!("B{rank}"), "NYK")],
        }
    }

    #[test]
    fn test_file_path_format() {
        let writer = SlipTableWriter::new("/tmp/out");
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let path = writer.file_path(4, ts);
        assert_eq!(
            path,
            PathBuf::from("/tmp/out/slips_4leg_20231114_221320.parquet")
        );
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = TempDir::new().unwrap();
        let writer = SlipTableWriter::new(dir.path());
        let path = writer.file_path(2, Utc::now());
        let slips = vec![slip(1), slip(2)];

        writer.write(&path, &slips).unwrap();
        let reader = SlipTableReader::new(&path);
        let read = reader.read().unwrap();

        assert_eq!(read, slips);
        assert_eq!(reader.path(), path.as_path());
    }

    #[test]
    fn test_empty_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let writer = SlipTableWriter::new(dir.path().join("nested"));
        let path = writer.file_path(3, Utc::now());
        writer.write(&path, &[]).unwrap();
        assert!(!path.exists());
    }
}
