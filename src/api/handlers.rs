//! API request handlers
//!
//! All endpoint handlers for the trade API.

use crate::store::{SortField, SortOrder, TradeFilter, TradeQuery};
use crate::types::{Direction, Trade};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// Response Helpers
// ==========================================

pub fn bad_request(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "success": false,
            "error": error
        }))
    ).into_response()
}

pub fn rejected_body(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    bad_request(&rejection.body_text())
}

pub fn rejected_query(rejection: QueryRejection) -> Response {
    warn!("Rejected query string: {}", rejection.body_text());
    bad_request(&rejection.body_text())
}

pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "error": "Trade not found"
        }))
    ).into_response()
}

// ==========================================
// Request Types
// ==========================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(alias = "assetClass")]
    pub asset_class: Option<String>,
    #[serde(alias = "dateFrom", alias = "start")]
    pub date_from: Option<DateTime<FixedOffset>>,
    #[serde(alias = "dateTo", alias = "end")]
    pub date_to: Option<DateTime<FixedOffset>>,
    #[serde(alias = "tradeType", alias = "trade_type")]
    pub direction: Option<Direction>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<Decimal>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(alias = "string")]
    pub search: Option<String>,
    #[serde(alias = "counter_party", alias = "counterParty")]
    pub counterparty: Option<String>,
    #[serde(alias = "instrumentId")]
    pub instrument_id: Option<String>,
    #[serde(alias = "instrumentName")]
    pub instrument_name: Option<String>,
    pub trader: Option<String>,
}

impl SearchQuery {
    /// First supplied term, in priority order
    fn term(self) -> Option<String> {
        self.search
            .or(self.counterparty)
            .or(self.instrument_id)
            .or(self.instrument_name)
            .or(self.trader)
    }
}

fn validate_trade(trade: &Trade) -> Result<(), String> {
    if trade.instrument_id.trim().is_empty() {
        return Err("instrumentId must not be empty".to_string());
    }
    if trade.instrument_name.trim().is_empty() {
        return Err("instrumentName must not be empty".to_string());
    }
    if trade.trader.trim().is_empty() {
        return Err("trader must not be empty".to_string());
    }
    if trade.price() < Decimal::ZERO {
        return Err(format!("price must not be negative (got {})", trade.price()));
    }
    Ok(())
}

// ==========================================
// Health
// ==========================================

pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "success": true,
        "status": "healthy",
        "service": "trade_store",
        "trades": state.store.len(),
    }))
}

// ==========================================
// Trade Handlers
// ==========================================

pub async fn create_trade(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Trade>, JsonRejection>,
) -> Response {
    let Json(mut trade) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };

    if let Err(e) = validate_trade(&trade) {
        warn!("Rejected trade: {}", e);
        return bad_request(&e);
    }

    if trade.trade_id.is_empty() {
        trade.trade_id = Uuid::new_v4().to_string();
    }

    state.store.insert(trade.clone());

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Trade created successfully",
            "data": trade
        }))
    ).into_response()
}

pub async fn list_trades(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejected_query(rejection),
    };

    let sort_field = match params.sort_by.as_deref().map(str::parse::<SortField>).transpose() {
        Ok(field) => field,
        Err(e) => return bad_request(&e.to_string()),
    };
    let sort_order = match params.order.as_deref().map(str::parse::<SortOrder>).transpose() {
        Ok(order) => order.unwrap_or_default(),
        Err(e) => return bad_request(&e.to_string()),
    };

    let query = TradeQuery {
        search: params.search,
        filter: TradeFilter {
            asset_class: params.asset_class,
            date_from: params.date_from,
            date_to: params.date_to,
            direction: params.direction,
            min_price: params.min_price,
            max_price: params.max_price,
        },
        sort: sort_field.map(|field| (field, sort_order)),
        offset: params.offset.unwrap_or(0),
        limit: params.limit.unwrap_or(state.config.default_page_limit),
    };
    debug!("List trades: {:?}", query);

    let page = state.store.query(&query);

    Json(serde_json::json!({
        "success": true,
        "total_results": page.total,
        "offset": page.offset,
        "limit": page.limit,
        "trades": page.items,
    })).into_response()
}

pub async fn search_trades(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejected_query(rejection),
    };

    let term = match params.term() {
        Some(term) => term,
        None => return bad_request("Provide one of: search, counterparty, instrumentId, instrumentName, trader"),
    };

    let trades = state.store.search(&term);
    debug!("Search {:?} matched {} trades", term, trades.len());

    Json(serde_json::json!({
        "success": true,
        "count": trades.len(),
        "trades": trades,
    })).into_response()
}

pub async fn get_trade(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<String>,
) -> Response {
    match state.store.get_by_id(&trade_id) {
        Some(trade) => Json(serde_json::json!({
            "success": true,
            "data": trade
        })).into_response(),
        None => not_found(),
    }
}

pub async fn update_trade(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<String>,
    body: Result<Json<Trade>, JsonRejection>,
) -> Response {
    let Json(mut trade) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };

    if let Err(e) = validate_trade(&trade) {
        warn!("Rejected update for {}: {}", trade_id, e);
        return bad_request(&e);
    }

    // Omitted id keeps the record's current id
    if trade.trade_id.is_empty() {
        trade.trade_id = trade_id.clone();
    }

    if state.store.update(&trade_id, trade.clone()) {
        Json(serde_json::json!({
            "success": true,
            "message": "Trade updated successfully",
            "data": trade
        })).into_response()
    } else {
        info!("Update target {} not found", trade_id);
        not_found()
    }
}

pub async fn delete_trade(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<String>,
) -> Response {
    if state.store.delete(&trade_id) {
        Json(serde_json::json!({
            "success": true,
            "message": "Trade deleted successfully"
        })).into_response()
    } else {
        info!("Delete target {} not found", trade_id);
        not_found()
    }
}
