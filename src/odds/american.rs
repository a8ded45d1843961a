//! American odds parsing and implied probability

use super::OddsError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A nonzero American odds price (e.g. -120, +150)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AmericanPrice(i32);

impl AmericanPrice {
    /// Even money
    pub const EVEN: AmericanPrice = AmericanPrice(100);

    /// Create a price, rejecting zero
    pub fn new(value: i32) -> Result<Self, OddsError> {
        if value == 0 {
            return Err(OddsError::InvalidOdds(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Raw integer value
    pub fn value(&self) -> i32 {
        self.0
    }

    /// Implied probability including the book's margin
    ///
    /// Negative prices: |p| / (|p| + 100). Positive prices: 100 / (p + 100).
    pub fn implied_probability(&self) -> f64 {
        let price = f64::from(self.0);
        if self.0 > 0 {
            100.0 / (price + 100.0)
        } else {
            price.abs() / (price.abs() + 100.0)
        }
    }
}

impl fmt::Display for AmericanPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for AmericanPrice {
    type Err = OddsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("even") || trimmed.eq_ignore_ascii_case("ev") {
            return Ok(Self::EVEN);
        }
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let value = digits
            .parse::<i32>()
            .map_err(|_| OddsError::InvalidOdds(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<i64> for AmericanPrice {
    type Error = OddsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = i32::try_from(value).map_err(|_| OddsError::InvalidOdds(value.to_string()))?;
        Self::new(value)
    }
}

/// Spreadsheet exports write whole prices as floats (`-120.0`)
impl TryFrom<f64> for AmericanPrice {
    type Error = OddsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 || value.abs() > f64::from(i32::MAX) {
            return Err(OddsError::InvalidOdds(value.to_string()));
        }
        Self::new(value as i32)
    }
}

impl Serialize for AmericanPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for AmericanPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PriceVisitor;

        impl<'de> Visitor<'de> for PriceVisitor {
            type Value = AmericanPrice;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a nonzero American odds integer or string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                AmericanPrice::try_from(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let v = i64::try_from(v).map_err(E::custom)?;
                self.visit_i64(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                AmericanPrice::try_from(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}
