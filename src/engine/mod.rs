//! Analysis engine
//!
//! Runs quote records through vig removal, edge evaluation, per-size pool
//! filtering and slip search, collecting counters and warnings along the way.

mod report;

pub use report::{AnalysisReport, EngineWarning, RunStats};

use crate::config::Config;
use crate::data::{QuoteBatch, QuoteRecord, RecordIssue};
use crate::edge::{EdgeEvaluator, EdgeProp, Evaluation, FairProp};
use crate::odds::{FairOddsModel, NoVigModel};
use crate::slip::{
    filter_by_threshold, PayoutTable, PoolFilter, SizeResult, SlipCombinator, ThresholdError,
    ThresholdTable,
};
use crate::telemetry::{self, GaugeMetric, LatencyMetric, SkipReason};
use chrono::Utc;
use std::collections::HashSet;
use std::time::Instant;
use uuid::Uuid;

/// One-shot analysis pipeline
pub struct AnalysisEngine<M: FairOddsModel = NoVigModel> {
    config: Config,
    model: M,
    evaluator: EdgeEvaluator,
    payouts: PayoutTable,
    thresholds: ThresholdTable,
}

impl AnalysisEngine<NoVigModel> {
    /// Create an engine with multiplicative vig removal
    pub fn from_config(config: &Config) -> Result<Self, ThresholdError> {
        Self::with_model(config, NoVigModel::new())
    }
}

impl<M: FairOddsModel> AnalysisEngine<M> {
    /// Create an engine with a custom fair odds model
    pub fn with_model(config: &Config, model: M) -> Result<Self, ThresholdError> {
        let payouts =
            PayoutTable::for_style(config.payout.style).with_overrides(&config.payout.custom)?;
        let thresholds = ThresholdTable::derive(&payouts)?;

        Ok(Self {
            config: config.clone(),
            model,
            evaluator: EdgeEvaluator::from_config(&config.engine),
            payouts,
            thresholds,
        })
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Turn records into candidate legs
    pub fn prepare(&self, records: &[QuoteRecord]) -> (Vec<EdgeProp>, RunStats) {
        let mut stats = RunStats {
            records: records.len(),
            ..RunStats::default()
        };
        let mut seen = HashSet::new();
        let mut pool = Vec::new();

        for record in records {
            if !seen.insert(record.dedup_key()) {
                stats.duplicates += 1;
                continue;
            }

            let (quote, fixed_line) = match record.resolve() {
                Ok(resolved) => resolved,
                Err(RecordIssue::MissingReference) => {
                    stats.missing_reference += 1;
                    continue;
                }
                Err(RecordIssue::MissingFixedLine) => {
                    stats.missing_fixed_line += 1;
                    continue;
                }
                Err(RecordIssue::InvalidOdds(e)) => {
                    tracing::debug!(player = %record.player, statistic = %record.statistic, error = %e, "Skipping record");
                    stats.skipped_invalid += 1;
                    continue;
                }
            };

            let fair = match FairProp::from_quote(quote, &self.model) {
                Ok(fair) => fair,
                Err(e) => {
                    tracing::debug!(player = %record.player, statistic = %record.statistic, error = %e, "Vig removal failed");
                    stats.skipped_invalid += 1;
                    continue;
                }
            };
            stats.fair_props += 1;

            match self.evaluator.evaluate(&fair, fixed_line) {
                Evaluation::Comparable(legs) => pool.extend(legs),
                Evaluation::Incomparable { .. } => stats.incomparable += 1,
            }
        }
        stats.edge_props = pool.len();

        telemetry::record_skipped(SkipReason::InvalidOdds, stats.skipped_invalid);
        telemetry::record_skipped(SkipReason::MissingReference, stats.missing_reference);
        telemetry::record_skipped(SkipReason::MissingFixedLine, stats.missing_fixed_line);
        telemetry::record_skipped(SkipReason::Incomparable, stats.incomparable);
        telemetry::record_skipped(SkipReason::Duplicate, stats.duplicates);
        telemetry::record_edge_props(stats.edge_props);

        tracing::info!(
            records = stats.records,
            skipped = stats.skipped(),
            incomparable = stats.incomparable,
            legs = stats.edge_props,
            "Prepared candidate legs"
        );

        (pool, stats)
    }

    /// Full analysis over a batch of records
    ///
    /// Always completes; sizes that cannot be searched come back empty with
    /// a warning.
    pub fn run(&self, records: &[QuoteRecord]) -> AnalysisReport {
        let started = Instant::now();
        let (pool, stats) = self.prepare(records);

        let filter = PoolFilter::new(&self.thresholds);
        let combinator = SlipCombinator::new(
            &self.thresholds,
            &self.payouts,
            &self.config.engine,
            &self.config.sampling,
        );

        let mut slip_sizes = self.config.engine.slip_sizes.clone();
        slip_sizes.sort_unstable();
        slip_sizes.dedup();

        let mut warnings = Vec::new();
        let sizes: Vec<SizeResult> = slip_sizes
            .into_iter()
            .map(|size| self.search_size(&filter, &combinator, &pool, size, &mut warnings))
            .collect();

        for warning in &warnings {
            tracing::warn!(%warning, "Analysis warning");
        }
        telemetry::record_latency(LatencyMetric::Analysis, started.elapsed());

        AnalysisReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            stats,
            top_props: self.top_props(&pool),
            sizes,
            warnings,
        }
    }

    /// Full analysis over a loaded batch, counting its malformed entries
    pub fn run_batch(&self, batch: &QuoteBatch) -> AnalysisReport {
        let mut report = self.run(&batch.records);
        report.stats.records += batch.malformed;
        report.stats.malformed = batch.malformed;
        telemetry::record_skipped(SkipReason::Malformed, batch.malformed);
        report
    }

    fn search_size(
        &self,
        filter: &PoolFilter<'_>,
        combinator: &SlipCombinator<'_>,
        pool: &[EdgeProp],
        size: usize,
        warnings: &mut Vec<EngineWarning>,
    ) -> SizeResult {
        let started = Instant::now();

        let eligible = match filter.filter(pool, size) {
            Ok(eligible) => eligible,
            Err(e) => {
                tracing::error!(size, error = %e, "No threshold for slip size");
                return SizeResult::empty(size, 0);
            }
        };
        telemetry::set_gauge(GaugeMetric::PoolSize { size }, eligible.len() as f64);

        if eligible.len() < size {
            telemetry::record_warning("insufficient_pool");
            warnings.push(EngineWarning::InsufficientPool {
                size,
                eligible: eligible.len(),
            });
            return SizeResult::empty(size, eligible.len());
        }

        let result = match combinator.build(&eligible, size) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(size, error = %e, "Slip search failed");
                return SizeResult::empty(size, eligible.len());
            }
        };

        if result.partial {
            telemetry::record_warning("sampling_budget_exhausted");
            warnings.push(EngineWarning::SamplingBudgetExhausted {
                size,
                found: result.slips.len(),
                wanted: self.config.engine.top_n_per_size,
            });
        }
        if result.exclusive_thinned {
            telemetry::record_warning("exclusive_legs_thinned");
            warnings.push(EngineWarning::ExclusiveLegsThinned {
                size,
                kept: result.slips.len(),
                wanted: self.config.engine.top_n_per_size,
            });
        }

        telemetry::set_gauge(GaugeMetric::SlipsKept { size }, result.slips.len() as f64);
        telemetry::record_latency(LatencyMetric::SlipSearch { size }, started.elapsed());
        result
    }

    /// Best single legs that clear the loosest per-leg threshold
    fn top_props(&self, pool: &[EdgeProp]) -> Vec<EdgeProp> {
        let floor = self.thresholds.loosest().unwrap_or(0.5);
        let mut props = filter_by_threshold(pool, floor);
        props.truncate(self.config.engine.top_props);
        props
    }
}
