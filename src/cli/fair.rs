//! Fair command implementation

use crate::odds::{AmericanPrice, FairOddsModel, NoVigModel};
use clap::Args;

#[derive(Args, Debug)]
pub struct FairArgs {
    /// Over price, e.g. -120 or EVEN
    #[arg(allow_hyphen_values = true)]
    pub over: AmericanPrice,

    /// Under price, e.g. +100
    #[arg(allow_hyphen_values = true)]
    pub under: AmericanPrice,
}

impl FairArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let fair = NoVigModel::new().fair_probs(self.over, self.under)?;

        println!(
            "Over  {:>6}  implied {:>6.2}%  fair {:>6.2}%",
            self.over.to_string(),
            self.over.implied_probability() * 100.0,
            fair.over * 100.0
        );
        println!(
            "Under {:>6}  implied {:>6.2}%  fair {:>6.2}%",
            self.under.to_string(),
            self.under.implied_probability() * 100.0,
            fair.under * 100.0
        );
        println!("Vig   {:>6.2}%", fair.vig() * 100.0);
        Ok(())
    }
}
