//! Query building blocks: filter criteria, sort fields and pages

use crate::types::{Direction, Trade};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

use super::StoreError;

/// Filter criteria (all fields optional, combined with AND)
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub asset_class: Option<String>,
    pub date_from: Option<DateTime<FixedOffset>>,
    pub date_to: Option<DateTime<FixedOffset>>,
    pub direction: Option<Direction>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl TradeFilter {
    pub fn matches(&self, trade: &Trade) -> bool {
        if let Some(asset_class) = &self.asset_class {
            if trade.asset_class.as_deref() != Some(asset_class.as_str()) {
                return false;
            }
        }
        if let Some(from) = &self.date_from {
            if trade.trade_date_time < *from {
                return false;
            }
        }
        if let Some(to) = &self.date_to {
            if trade.trade_date_time > *to {
                return false;
            }
        }
        if let Some(direction) = self.direction {
            if trade.direction() != direction {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if trade.price() < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if trade.price() > max {
                return false;
            }
        }
        true
    }
}

/// Fields a trade sequence can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    AssetClass,
    Counterparty,
    InstrumentId,
    InstrumentName,
    TradeDateTime,
    TradeId,
    Trader,
    Direction,
    Price,
    Quantity,
}

impl SortField {
    pub fn compare(&self, a: &Trade, b: &Trade) -> Ordering {
        match self {
            SortField::AssetClass => a.asset_class.cmp(&b.asset_class),
            SortField::Counterparty => a.counterparty.cmp(&b.counterparty),
            SortField::InstrumentId => a.instrument_id.cmp(&b.instrument_id),
            SortField::InstrumentName => a.instrument_name.cmp(&b.instrument_name),
            SortField::TradeDateTime => a.trade_date_time.cmp(&b.trade_date_time),
            SortField::TradeId => a.trade_id.cmp(&b.trade_id),
            SortField::Trader => a.trader.cmp(&b.trader),
            SortField::Direction => a.direction().cmp(&b.direction()),
            SortField::Price => a.price().cmp(&b.price()),
            SortField::Quantity => a.trade_details.quantity.cmp(&b.trade_details.quantity),
        }
    }
}

impl FromStr for SortField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "assetClass" | "asset_class" => SortField::AssetClass,
            "counterparty" => SortField::Counterparty,
            "instrumentId" | "instrument_id" => SortField::InstrumentId,
            "instrumentName" | "instrument_name" => SortField::InstrumentName,
            "tradeDateTime" | "trade_date_time" => SortField::TradeDateTime,
            "tradeId" | "trade_id" => SortField::TradeId,
            "trader" => SortField::Trader,
            "tradeDetails.direction"
            | "tradeDetails.buySellIndicator"
            | "trade_details.direction"
            | "trade_details.buySellIndicator"
            | "direction" => SortField::Direction,
            "tradeDetails.price" | "trade_details.price" | "price" => SortField::Price,
            "tradeDetails.quantity" | "trade_details.quantity" | "quantity" => SortField::Quantity,
            other => return Err(StoreError::UnknownSortField(other.to_string())),
        };
        Ok(field)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(StoreError::UnknownSortOrder(s.to_string())),
        }
    }
}

/// Stable in-place sort. Equal elements keep their relative order in both directions.
pub fn sort_trades(trades: &mut [Trade], field: SortField, order: SortOrder) {
    match order {
        SortOrder::Ascending => trades.sort_by(|a, b| field.compare(a, b)),
        SortOrder::Descending => trades.sort_by(|a, b| field.compare(b, a)),
    }
}

/// Offset-based slice of a result sequence plus its pre-slice total
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

pub fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Page<T> {
    let total = items.len();
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page {
        items,
        total,
        offset,
        limit,
    }
}

/// Composed list request: search, filter, sort, then paginate
#[derive(Debug, Clone)]
pub struct TradeQuery {
    pub search: Option<String>,
    pub filter: TradeFilter,
    pub sort: Option<(SortField, SortOrder)>,
    pub offset: usize,
    pub limit: usize,
}

impl TradeQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            search: None,
            filter: TradeFilter::default(),
            sort: None,
            offset: 0,
            limit,
        }
    }
}
