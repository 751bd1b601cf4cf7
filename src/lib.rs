//! Trade record service
//!
//! In-memory trade store with search, filtering, sorting and pagination,
//! served over an Axum HTTP API.

pub mod api;
pub mod config;
pub mod store;
pub mod types;

use crate::config::ServerConfig;
use crate::store::TradeStore;

/// Application state shared across all handlers
pub struct AppState {
    pub store: TradeStore,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: TradeStore::new(),
            config,
        }
    }
}
