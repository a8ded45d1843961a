//! Prop types

use crate::odds::{AmericanPrice, FairOddsModel, OddsError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a player prop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickSide {
    /// More than the line
    Over,
    /// Less than the line
    Under,
}

impl PickSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickSide::Over => "OVER",
            PickSide::Under => "UNDER",
        }
    }
}

impl fmt::Display for PickSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reference-book market observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub player: String,
    pub statistic: String,
    pub sport: String,
    pub team: String,
    pub opponent: Option<String>,
    pub position: Option<String>,
    /// Reference-book line
    pub line_value: Decimal,
    pub over_price: AmericanPrice,
    pub under_price: AmericanPrice,
}

impl OddsQuote {
    /// Identifier of the underlying prop (player + statistic)
    pub fn prop_id(&self) -> String {
        format!("{}_{}", self.player, self.statistic)
    }
}

/// Quote annotated with vig-free probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairProp {
    pub quote: OddsQuote,
    pub fair_over_prob: f64,
    pub fair_under_prob: f64,
    /// Book margin the fair pair was extracted from
    pub overround: f64,
}

impl FairProp {
    /// Run a quote through a fair odds model
    pub fn from_quote<M: FairOddsModel + ?Sized>(
        quote: OddsQuote,
        model: &M,
    ) -> Result<Self, OddsError> {
        let fair = model.fair_probs(quote.over_price, quote.under_price)?;
        Ok(Self {
            quote,
            fair_over_prob: fair.over,
            fair_under_prob: fair.under,
            overround: fair.overround,
        })
    }

    /// Fair probability for one side
    pub fn fair_prob(&self, side: PickSide) -> f64 {
        match side {
            PickSide::Over => self.fair_over_prob,
            PickSide::Under => self.fair_under_prob,
        }
    }
}

/// A candidate leg: one side of a comparable prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeProp {
    pub prop: FairProp,
    /// Fixed-line product's line
    pub fixed_line: Decimal,
    pub pick_side: PickSide,
    /// Win probability for `pick_side` at the fixed line
    pub edge_prob: f64,
    /// Fixed line minus reference line
    pub line_delta: Decimal,
}

impl EdgeProp {
    pub fn player(&self) -> &str {
        &self.prop.quote.player
    }

    pub fn team(&self) -> &str {
        &self.prop.quote.team
    }

    pub fn statistic(&self) -> &str {
        &self.prop.quote.statistic
    }
}
