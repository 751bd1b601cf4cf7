//! Type definitions for trade records
//!
//! Wire names are camelCase; snake_case names are accepted as aliases.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[serde(alias = "buy")]
    Buy,
    #[serde(alias = "sell")]
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price, quantity and side of a trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDetails {
    #[serde(rename = "buySellIndicator", alias = "direction")]
    pub direction: Direction,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u64,
}

/// A single executed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(default, alias = "asset_class")]
    pub asset_class: Option<String>,
    #[serde(default)]
    pub counterparty: Option<String>,
    #[serde(alias = "instrument_id")]
    pub instrument_id: String,
    #[serde(alias = "instrument_name")]
    pub instrument_name: String,
    #[serde(alias = "trade_date_time")]
    pub trade_date_time: DateTime<FixedOffset>,
    #[serde(alias = "trade_details")]
    pub trade_details: TradeDetails,
    /// Empty when the client omitted it; the API mints one before storing
    #[serde(default, alias = "trade_id")]
    pub trade_id: String,
    pub trader: String,
}

impl Trade {
    pub fn price(&self) -> Decimal {
        self.trade_details.price
    }

    pub fn direction(&self) -> Direction {
        self.trade_details.direction
    }
}

fn write_optional(f: &mut fmt::Formatter<'_>, name: &str, value: Option<&str>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{}='{}'", name, v),
        None => write!(f, "{}=None", name),
    }
}

/// Full textual rendering used by substring search.
impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_optional(f, "asset_class", self.asset_class.as_deref())?;
        f.write_str(" ")?;
        write_optional(f, "counterparty", self.counterparty.as_deref())?;
        write!(
            f,
            " instrument_id='{}' instrument_name='{}' trade_date_time={} trade_details={} trade_id='{}' trader='{}'",
            self.instrument_id,
            self.instrument_name,
            self.trade_date_time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.trade_details,
            self.trade_id,
            self.trader,
        )
    }
}

impl fmt::Display for TradeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Whole prices keep one decimal place, so 150 renders as 150.0
        let mut price = self.price;
        if price.scale() == 0 {
            price.rescale(1);
        }
        write!(
            f,
            "TradeDetails(buySellIndicator='{}' price={} quantity={})",
            self.direction, price, self.quantity
        )
    }
}
