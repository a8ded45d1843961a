//! Run report types

use crate::edge::EdgeProp;
use crate::slip::SizeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Records received, including malformed ones
    pub records: usize,
    /// Entries that could not be read as a record
    #[serde(default)]
    pub malformed: usize,
    /// Records with a zero or malformed price
    pub skipped_invalid: usize,
    /// Records lacking reference prices or line
    pub missing_reference: usize,
    /// Records lacking a fixed-product line
    pub missing_fixed_line: usize,
    /// Repeats of an earlier player/team/sport/statistic
    pub duplicates: usize,
    /// Props whose lines differ by more than the tolerance
    pub incomparable: usize,
    /// Props converted to fair probabilities
    pub fair_props: usize,
    /// Candidate legs produced
    pub edge_props: usize,
}

impl RunStats {
    /// Records that did not yield a fair prop
    pub fn skipped(&self) -> usize {
        self.malformed
            + self.skipped_invalid
            + self.missing_reference
            + self.missing_fixed_line
            + self.duplicates
    }
}

/// Non-fatal conditions surfaced with the results
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineWarning {
    #[error("size {size}: only {eligible} eligible props")]
    InsufficientPool { size: usize, eligible: usize },
    #[error("size {size}: sampling found {found} of {wanted} slips")]
    SamplingBudgetExhausted {
        size: usize,
        found: usize,
        wanted: usize,
    },
    #[error("size {size}: exclusive legs kept {kept} of {wanted} slips")]
    ExclusiveLegsThinned {
        size: usize,
        kept: usize,
        wanted: usize,
    },
}

/// Everything a run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub stats: RunStats,
    /// Best single legs by edge probability
    pub top_props: Vec<EdgeProp>,
    /// Ordered by slip size
    pub sizes: Vec<SizeResult>,
    pub warnings: Vec<EngineWarning>,
}

impl AnalysisReport {
    /// Result for one slip size
    pub fn size(&self, size: usize) -> Option<&SizeResult> {
        self.sizes.iter().find(|r| r.size == size)
    }

    /// Total slips across sizes
    pub fn slip_count(&self) -> usize {
        self.sizes.iter().map(|r| r.slips.len()).sum()
    }

    /// Format as a table for display
    pub fn format_table(&self) -> String {
        let mut out = format!(
            r#"
══════════════════════════════════════════════════════
               PROP EV ANALYSIS
══════════════════════════════════════════════════════

INPUT
───────────────────────────────────────────────────────
Records:          {}
Skipped:          {} (malformed {}, invalid {}, no reference {}, no line {}, duplicate {})
Incomparable:     {}
Fair Props:       {}
Candidate Legs:   {}
"#,
            self.stats.records,
            self.stats.skipped(),
            self.stats.malformed,
            self.stats.skipped_invalid,
            self.stats.missing_reference,
            self.stats.missing_fixed_line,
            self.stats.duplicates,
            self.stats.incomparable,
            self.stats.fair_props,
            self.stats.edge_props,
        );

        out.push_str("\nTOP PROPS\n───────────────────────────────────────────────────────\n");
        for leg in self.top_props.iter().take(10) {
            out.push_str(&format!(
                "{:<24} {:<16} {:<5} {:>6} {:>6.2}%\n",
                leg.player(),
                leg.statistic(),
                leg.pick_side.as_str(),
                leg.fixed_line.to_string(),
                leg.edge_prob * 100.0,
            ));
        }

        for result in &self.sizes {
            out.push_str(&format!(
                "\n{}-LEG SLIPS ({}, {} eligible{}{})\n───────────────────────────────────────────────────────\n",
                result.size,
                result.strategy,
                result.eligible,
                if result.partial { ", partial" } else { "" },
                if result.exclusive_thinned { ", exclusive" } else { "" },
            ));
            for (rank, slip) in result.slips.iter().enumerate() {
                out.push_str(&format!(
                    "#{:<3} prob {:>6.2}%  avg {:>6.2}%  edge {:>+6.2}%  EV {:>+6.2}%  {}\n",
                    rank + 1,
                    slip.combined_prob * 100.0,
                    slip.avg_leg_prob() * 100.0,
                    slip.combined_edge * 100.0,
                    slip.expected_return * 100.0,
                    slip.players().join(", "),
                ));
            }
        }

        if !self.warnings.is_empty() {
            out.push_str("\nWARNINGS\n───────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                out.push_str(&format!("{warning}\n"));
            }
        }
        out.push_str("══════════════════════════════════════════════════════\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = EngineWarning::SamplingBudgetExhausted {
            size: 6,
            found: 4,
            wanted: 10,
        };
        assert_eq!(warning.to_string(), "size 6: sampling found 4 of 10 slips");
    }

    #[test]
    fn test_exclusive_warning_is_distinct_from_sampling() {
        let warning = EngineWarning::ExclusiveLegsThinned {
            size: 6,
            kept: 5,
            wanted: 10,
        };
        assert_eq!(warning.to_string(), "size 6: exclusive legs kept 5 of 10 slips");
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "exclusive_legs_thinned");
    }

    #[test]
    fn test_warning_serializes_tagged() {
        let warning = EngineWarning::InsufficientPool {
            size: 5,
            eligible: 3,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "insufficient_pool");
        assert_eq!(json["eligible"], 3);
    }

    #[test]
    fn test_empty_report_table() {
        let report = AnalysisReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            stats: RunStats {
                records: 3,
                malformed: 1,
                missing_reference: 1,
                ..RunStats::default()
            },
            top_props: vec![],
            sizes: vec![SizeResult::empty(2, 0)],
            warnings: vec![EngineWarning::InsufficientPool {
                size: 2,
                eligible: 0,
            }],
        };
        let table = report.format_table();
        assert_eq!(report.stats.skipped(), 2);
        assert!(table.contains("(malformed 1, invalid 0, no reference 1"));
        assert!(table.contains("2-LEG SLIPS"));
        assert!(table.contains("size 2: only 0 eligible props"));
        assert_eq!(report.slip_count(), 0);
        assert!(report.size(2).is_some());
        assert!(report.size(3).is_none());
    }
}
