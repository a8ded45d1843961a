//! Thresholds command implementation

use crate::config::Config;
use crate::slip::{PayoutStyle, PayoutTable, ThresholdTable};
use clap::Args;

#[derive(Args, Debug)]
pub struct ThresholdsArgs {
    /// Payout schedule: power or flex (defaults to payout.style)
    #[arg(long)]
    pub style: Option<PayoutStyle>,
}

impl ThresholdsArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let style = self.style.unwrap_or(config.payout.style);
        let payouts = PayoutTable::for_style(style).with_overrides(&config.payout.custom)?;
        let table = ThresholdTable::derive(&payouts)?;

        println!("Break-even thresholds ({style})");
        print!("{}", table.format_table());
        Ok(())
    }
}
