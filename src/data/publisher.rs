//! Result publishing
//!
//! Ranked slips become flat rows, written as one Parquet table per slip size
//! plus a JSON report of the whole run.

use super::parquet::SlipTableWriter;
use crate::edge::EdgeProp;
use crate::engine::AnalysisReport;
use crate::slip::{SizeResult, SlipCandidate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// One leg of a published slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegRow {
    pub leg_index: u32,
    pub player: String,
    pub team: String,
    pub statistic: String,
    /// "OVER" or "UNDER"
    pub side: String,
    pub fixed_line: Decimal,
    pub reference_line: Decimal,
    pub edge_prob: f64,
}

impl LegRow {
    pub fn from_leg(leg_index: u32, leg: &EdgeProp) -> Self {
        Self {
            leg_index,
            player: leg.player().to_string(),
            team: leg.team().to_string(),
            statistic: leg.statistic().to_string(),
            side: leg.pick_side.as_str().to_string(),
            fixed_line: leg.fixed_line,
            reference_line: leg.prop.quote.line_value,
            edge_prob: leg.edge_prob,
        }
    }
}

/// One published slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipRow {
    /// 1-based position in the size's ranking
    pub rank: u32,
    pub size: usize,
    pub combined_prob: f64,
    pub combined_edge: f64,
    pub expected_return: f64,
    pub teams: Vec<String>,
    pub legs: Vec<LegRow>,
}

impl SlipRow {
    pub fn from_candidate(rank: u32, slip: &SlipCandidate) -> Self {
        Self {
            rank,
            size: slip.size,
            combined_prob: slip.combined_prob,
            combined_edge: slip.combined_edge,
            expected_return: slip.expected_return,
            teams: slip.teams.iter().cloned().collect(),
            legs: slip
                .legs
                .iter()
                .enumerate()
                .map(|(i, leg)| LegRow::from_leg(i as u32, leg))
                .collect(),
        }
    }
}

/// Rows for a size's ranked slips, best first
pub fn slip_rows(result: &SizeResult) -> Vec<SlipRow> {
    result
        .slips
        .iter()
        .enumerate()
        .map(|(i, slip)| SlipRow::from_candidate(i as u32 + 1, slip))
        .collect()
}

/// Paths written by one publish
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishedFiles {
    /// Slip tables in size order; sizes without slips have none
    pub slip_tables: Vec<(usize, PathBuf)>,
    pub report: PathBuf,
}

/// Writes analysis results to the output directory
pub struct ResultPublisher {
    output_dir: PathBuf,
    tables: SlipTableWriter,
}

impl ResultPublisher {
    /// Create a new publisher
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Self {
            tables: SlipTableWriter::new(output_dir.clone()),
            output_dir,
        }
    }

    /// Write every non-empty size table and the JSON report
    pub fn publish(&self, report: &AnalysisReport) -> anyhow::Result<PublishedFiles> {
        fs::create_dir_all(&self.output_dir)?;

        let mut files = PublishedFiles::default();
        for result in &report.sizes {
            let rows = slip_rows(result);
            if rows.is_empty() {
                continue;
            }
            let path = self.tables.file_path(result.size, report.generated_at);
            self.tables.write(&path, &rows)?;
            files.slip_tables.push((result.size, path));
        }

        let report_path = self.output_dir.join(format!(
            "report_{}.json",
            report.generated_at.format("%Y%m%d_%H%M%S")
        ));
        fs::write(&report_path, serde_json::to_string_pretty(report)?)?;
        files.report = report_path;

        tracing::info!(
            run_id = %report.run_id,
            tables = files.slip_tables.len(),
            report = %files.report.display(),
            "Published results"
        );

        Ok(files)
    }
}
