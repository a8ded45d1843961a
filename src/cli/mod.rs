//! CLI interface for prop-ev
//!
//! Provides subcommands for:
//! - `analyze`: Find +EV props and build ranked slips
//! - `thresholds`: Show break-even thresholds per slip size
//! - `fair`: Remove the vig from one over/under price pair
//! - `inspect`: Read back a published slip table
//! - `config`: Show effective configuration

mod analyze;
mod fair;
mod inspect;
mod thresholds;

pub use analyze::AnalyzeArgs;
pub use fair::FairArgs;
pub use inspect::InspectArgs;
pub use thresholds::ThresholdsArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "prop-ev")]
#[command(about = "Finds +EV player props against no-vig reference odds and builds ranked slips")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find +EV props and build ranked slips
    Analyze(AnalyzeArgs),
    /// Show break-even thresholds per slip size
    Thresholds(ThresholdsArgs),
    /// Convert an over/under price pair to fair probabilities
    Fair(FairArgs),
    /// Print a published slip table
    Inspect(InspectArgs),
    /// Show effective configuration
    Config,
}
