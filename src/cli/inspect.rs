//! Inspect command implementation

use crate::data::SlipTableReader;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Published slip table
    pub path: PathBuf,

    /// Show at most this many slips
    #[arg(long)]
    pub limit: Option<usize>,
}

impl InspectArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let reader = SlipTableReader::new(&self.path);
        let slips = reader.read()?;
        let limit = self.limit.unwrap_or(slips.len());

        println!("{}: {} slips", reader.path().display(), slips.len());
        for slip in slips.iter().take(limit) {
            println!(
                "#{:<3} {}-leg  prob {:>6.2}%  edge {:>+6.2}%  EV {:>+6.2}%  teams {}",
                slip.rank,
                slip.size,
                slip.combined_prob * 100.0,
                slip.combined_edge * 100.0,
                slip.expected_return * 100.0,
                slip.teams.join(", ")
            );
            for leg in &slip.legs {
                println!(
                    "      {:<24} {:<5} {:>6} {:<16} ({:.2}%, ref {})",
                    leg.player,
                    leg.side,
                    leg.fixed_line.to_string(),
                    leg.statistic,
                    leg.edge_prob * 100.0,
                    leg.reference_line
                );
            }
        }
        Ok(())
    }
}
