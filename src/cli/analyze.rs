//! Analyze command implementation

use crate::config::Config;
use crate::data::{source_for, ResultPublisher};
use crate::engine::AnalysisEngine;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Quote file or directory (overrides data.input)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory (overrides data.output_dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Slip sizes to build, e.g. 2,3,6
    #[arg(long, value_delimiter = ',')]
    pub sizes: Vec<usize>,

    /// Random seed for sampled sizes
    #[arg(long)]
    pub seed: Option<u64>,

    /// Slips kept per size
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Drop slips that reuse a prop from a better-ranked slip
    #[arg(long)]
    pub exclusive: bool,

    /// Skip writing Parquet tables and the JSON report
    #[arg(long)]
    pub no_publish: bool,

    /// Output format: json or table
    #[arg(long, default_value = "table")]
    pub format: String,
}

impl AnalyzeArgs {
    /// Config with command-line overrides applied
    pub fn effective_config(&self, config: &Config) -> anyhow::Result<Config> {
        let mut config = config.clone();
        if let Some(ref input) = self.input {
            config.data.input = input.clone();
        }
        if let Some(ref output) = self.output {
            config.data.output_dir = output.clone();
        }
        if !self.sizes.is_empty() {
            config.engine.slip_sizes = self.sizes.clone();
        }
        if let Some(seed) = self.seed {
            config.engine.random_seed = seed;
        }
        if let Some(top_n) = self.top_n {
            config.engine.top_n_per_size = top_n;
        }
        if self.exclusive {
            config.engine.exclusive_legs = true;
        }
        config.validate()?;
        Ok(config)
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let config = self.effective_config(config)?;
        let engine = AnalysisEngine::from_config(&config)?;
        for threshold in engine.thresholds().iter() {
            tracing::debug!(
                size = threshold.size,
                per_leg = threshold.per_leg,
                breakeven = threshold.breakeven_combined,
                "Break-even threshold"
            );
        }

        let batch = source_for(&config.data.input)
            .load()
            .await
            .with_context(|| format!("loading quotes from {}", config.data.input.display()))?;
        tracing::info!(
            records = batch.len(),
            malformed = batch.malformed,
            input = %config.data.input.display(),
            "Loaded quotes"
        );

        let report = tokio::task::spawn_blocking(move || engine.run_batch(&batch)).await?;

        if !self.no_publish {
            ResultPublisher::new(&config.data.output_dir).publish(&report)?;
        }

        match self.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&report)?),
            _ => println!("{}", report.format_table()),
        }

        Ok(())
    }
}
