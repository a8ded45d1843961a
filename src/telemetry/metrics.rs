//! Prometheus metrics

use ::metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Why a quote record did not become a candidate leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Zero or malformed price
    InvalidOdds,
    /// Reference prices or line absent
    MissingReference,
    /// Fixed-product line absent
    MissingFixedLine,
    /// Lines further apart than the tolerance
    Incomparable,
    /// Same player, team, sport and statistic seen earlier
    Duplicate,
    /// Record that could not be read at all
    Malformed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InvalidOdds => "invalid_odds",
            SkipReason::MissingReference => "missing_reference",
            SkipReason::MissingFixedLine => "missing_fixed_line",
            SkipReason::Incomparable => "incomparable",
            SkipReason::Duplicate => "duplicate",
            SkipReason::Malformed => "malformed",
        }
    }
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Whole analysis run
    Analysis,
    /// Slip search for one size
    SlipSearch { size: usize },
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Props clearing a size's threshold
    PoolSize { size: usize },
    /// Slips kept for a size
    SlipsKept { size: usize },
}

/// Count skipped quote records
pub fn record_skipped(reason: SkipReason, count: usize) {
    if count == 0 {
        return;
    }
    counter!("propev_quotes_skipped_total", "reason" => reason.as_str()).increment(count as u64);
}

/// Count candidate legs produced
pub fn record_edge_props(count: usize) {
    counter!("propev_edge_props_total").increment(count as u64);
}

/// Count non-fatal engine warnings
pub fn record_warning(kind: &'static str) {
    counter!("propev_warnings_total", "kind" => kind).increment(1);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let value_ms = duration.as_secs_f64() * 1000.0;
    match metric {
        LatencyMetric::Analysis => histogram!("propev_analysis_latency_ms").record(value_ms),
        LatencyMetric::SlipSearch { size } => {
            histogram!("propev_slip_search_latency_ms", "size" => size.to_string()).record(value_ms)
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    match metric {
        GaugeMetric::PoolSize { size } => {
            gauge!("propev_pool_size", "size" => size.to_string()).set(value)
        }
        GaugeMetric::SlipsKept { size } => {
            gauge!("propev_slips_kept", "size" => size.to_string()).set(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_labels_are_distinct() {
        let labels = [
            SkipReason::InvalidOdds,
            SkipReason::MissingReference,
            SkipReason::MissingFixedLine,
            SkipReason::Incomparable,
            SkipReason::Duplicate,
            SkipReason::Malformed,
        ]
        .map(|r| r.as_str());
        let mut unique = labels.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_skipped(SkipReason::Duplicate, 2);
        record_latency(LatencyMetric::SlipSearch { size: 3 }, Duration::from_millis(4));
        set_gauge(GaugeMetric::PoolSize { size: 3 }, 12.0);
    }
}
