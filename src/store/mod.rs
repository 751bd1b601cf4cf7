//! In-memory trade store
//!
//! Insertion order is the canonical iteration order. Every operation holds
//! the lock for its whole duration, so no caller observes a partial write.

mod query;

pub use query::*;

use crate::types::Trade;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),
    #[error("Unknown sort order: {0} (expected asc or desc)")]
    UnknownSortOrder(String),
}

/// Ordered collection of trades behind a single reader/writer lock
#[derive(Default)]
pub struct TradeStore {
    trades: RwLock<Vec<Trade>>,
}

impl TradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trades.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.read().is_empty()
    }

    /// Append a trade. Duplicate ids are accepted.
    pub fn insert(&self, trade: Trade) {
        let mut trades = self.trades.write();
        if trades.iter().any(|t| t.trade_id == trade.trade_id) {
            warn!("Inserting trade with duplicate id {}", trade.trade_id);
        }
        info!("Stored trade {} ({} {})", trade.trade_id, trade.direction(), trade.instrument_id);
        trades.push(trade);
    }

    /// First trade whose id matches exactly
    pub fn get_by_id(&self, trade_id: &str) -> Option<Trade> {
        self.trades
            .read()
            .iter()
            .find(|t| t.trade_id == trade_id)
            .cloned()
    }

    /// Case-insensitive substring search over each trade's full rendering
    pub fn search(&self, query: &str) -> Vec<Trade> {
        let needle = query.to_lowercase();
        self.trades
            .read()
            .iter()
            .filter(|t| matches_text(t, &needle))
            .cloned()
            .collect()
    }

    pub fn filter(&self, filter: &TradeFilter) -> Vec<Trade> {
        self.trades
            .read()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// Search, filter, sort and paginate under one read lock.
    /// The page total counts matches before slicing.
    pub fn query(&self, query: &TradeQuery) -> Page<Trade> {
        let needle = query.search.as_ref().map(|s| s.to_lowercase());

        let mut results: Vec<Trade> = self
            .trades
            .read()
            .iter()
            .filter(|t| needle.as_deref().map_or(true, |n| matches_text(t, n)))
            .filter(|t| query.filter.matches(t))
            .cloned()
            .collect();

        if let Some((field, order)) = query.sort {
            sort_trades(&mut results, field, order);
        }

        debug!(
            "Query matched {} trades (offset={}, limit={}, sort={:?})",
            results.len(),
            query.offset,
            query.limit,
            query.sort
        );

        paginate(results, query.offset, query.limit)
    }

    /// Replace the first matching trade in place. The replacement may carry a new id.
    pub fn update(&self, trade_id: &str, trade: Trade) -> bool {
        let mut trades = self.trades.write();
        match trades.iter_mut().find(|t| t.trade_id == trade_id) {
            Some(slot) => {
                if slot.trade_id != trade.trade_id {
                    info!("Trade {} renamed to {}", trade_id, trade.trade_id);
                }
                *slot = trade;
                info!("Updated trade {}", trade_id);
                true
            }
            None => false,
        }
    }

    /// Remove the first matching trade
    pub fn delete(&self, trade_id: &str) -> bool {
        let mut trades = self.trades.write();
        match trades.iter().position(|t| t.trade_id == trade_id) {
            Some(index) => {
                trades.remove(index);
                info!("Deleted trade {}", trade_id);
                true
            }
            None => false,
        }
    }
}

fn matches_text(trade: &Trade, needle: &str) -> bool {
    trade.to_string().to_lowercase().contains(needle)
}
