//! API module - Axum HTTP server and routes

mod handlers;

use crate::AppState;
use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main application router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))

        // ==========================================
        // Trades
        // ==========================================
        .route("/trades", get(handlers::list_trades).post(handlers::create_trade))
        .route("/trades/search", get(handlers::search_trades))
        .route(
            "/trades/:trade_id",
            get(handlers::get_trade)
                .put(handlers::update_trade)
                .delete(handlers::delete_trade),
        )

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::types::Trade;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn make_state() -> Arc<AppState> {
        Arc::new(AppState::new(ServerConfig::default()))
    }

    fn trade_json(id: &str, instrument: &str, trader: &str, side: &str, price: f64, quantity: u64) -> Value {
        json!({
            "assetClass": "Equity",
            "counterparty": "Goldman",
            "instrumentId": instrument,
            "instrumentName": format!("{} Inc", instrument),
            "tradeDateTime": "2024-05-01T09:00:00+00:00",
            "tradeDetails": { "buySellIndicator": side, "price": price, "quantity": quantity },
            "tradeId": id,
            "trader": trader
        })
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn seeded() -> Arc<AppState> {
        let state = make_state();
        for body in [
            trade_json("T1", "AAPL", "Alice", "BUY", 150.0, 10),
            trade_json("T2", "TSLA", "Bob", "SELL", 700.0, 5),
            trade_json("T3", "AMZN", "Carol", "BUY", 180.0, 2),
        ] {
            let (status, _) = send(create_router(state.clone()), "POST", "/trades", Some(body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        state
    }

    fn ids(value: &Value) -> Vec<String> {
        value["trades"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["tradeId"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = seeded().await;
        let (status, body) = send(create_router(state), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["trades"], 3);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let state = make_state();
        let trade = trade_json("T1", "AAPL", "Alice", "BUY", 150.0, 10);

        let (status, body) = send(create_router(state.clone()), "POST", "/trades", Some(trade.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);

        let (status, body) = send(create_router(state), "GET", "/trades/T1", None).await;
        assert_eq!(status, StatusCode::OK);
        let sent: Trade = serde_json::from_value(trade).unwrap();
        let stored: Trade = serde_json::from_value(body["data"].clone()).unwrap();
        assert_eq!(stored, sent);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_error_envelope() {
        let state = make_state();
        let mut trade = trade_json("T1", "AAPL", "Alice", "BUY", 150.0, 10);
        trade.as_object_mut().unwrap().remove("trader");

        let (status, body) = send(create_router(state.clone()), "POST", "/trades", Some(trade.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("trader"));
        assert!(state.store.is_empty());

        let (status, body) = send(create_router(state), "PUT", "/trades/T1", Some(trade)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_query_gets_error_envelope() {
        let state = seeded().await;

        let (status, body) = send(create_router(state.clone()), "GET", "/trades?limit=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        let (status, body) = send(create_router(state), "GET", "/trades?minPrice=cheap", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_create_mints_missing_id() {
        let state = make_state();
        let mut trade = trade_json("", "AAPL", "Alice", "BUY", 150.0, 10);
        trade.as_object_mut().unwrap().remove("tradeId");

        let (status, body) = send(create_router(state.clone()), "POST", "/trades", Some(trade)).await;
        assert_eq!(status, StatusCode::CREATED);

        let id = body["data"]["tradeId"].as_str().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert!(state.store.get_by_id(&id).is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_negative_price() {
        let state = make_state();
        let trade = trade_json("T1", "AAPL", "Alice", "BUY", -1.0, 10);

        let (status, body) = send(create_router(state.clone()), "POST", "/trades", Some(trade)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (status, body) = send(create_router(make_state()), "GET", "/trades/NOPE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Trade not found");
    }

    #[tokio::test]
    async fn test_list_filters_and_reports_total() {
        let state = seeded().await;

        let (status, body) = send(create_router(state.clone()), "GET", "/trades?direction=BUY", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec!["T1", "T3"]);
        assert_eq!(body["total_results"], 2);

        let (_, body) = send(create_router(state.clone()), "GET", "/trades?minPrice=200", None).await;
        assert_eq!(ids(&body), vec!["T2"]);

        let (_, body) = send(create_router(state.clone()), "GET", "/trades?trade_type=buy&max_price=160", None).await;
        assert_eq!(ids(&body), vec!["T1"]);

        let (_, body) = send(create_router(state), "GET", "/trades?assetClass=Bond", None).await;
        assert_eq!(body["total_results"], 0);
        assert!(ids(&body).is_empty());
    }

    #[tokio::test]
    async fn test_list_sort_and_paginate() {
        let state = seeded().await;

        let (status, body) = send(
            create_router(state.clone()),
            "GET",
            "/trades?sortBy=tradeDetails.price&order=desc&limit=2",
            None,
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec!["T2", "T3"]);
        assert_eq!(body["total_results"], 3);
        assert_eq!(body["limit"], 2);

        let (_, body) = send(create_router(state.clone()), "GET", "/trades?sort_by=trader&offset=1", None).await;
        assert_eq!(ids(&body), vec!["T2", "T3"]);

        let (_, body) = send(create_router(state), "GET", "/trades?offset=10", None).await;
        assert!(ids(&body).is_empty());
        assert_eq!(body["total_results"], 3);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_sort() {
        let state = seeded().await;

        let (status, body) = send(create_router(state.clone()), "GET", "/trades?sortBy=colour", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown sort field: colour");

        let (status, _) = send(create_router(state), "GET", "/trades?sortBy=trader&order=up", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_date_range() {
        let state = make_state();
        let mut early = trade_json("E", "AAPL", "Alice", "BUY", 1.0, 1);
        early["tradeDateTime"] = json!("2024-01-01T00:00:00Z");
        let mut late = trade_json("L", "AAPL", "Alice", "BUY", 1.0, 1);
        late["tradeDateTime"] = json!("2024-12-31T00:00:00Z");
        send(create_router(state.clone()), "POST", "/trades", Some(early)).await;
        send(create_router(state.clone()), "POST", "/trades", Some(late)).await;

        let (_, body) = send(
            create_router(state.clone()),
            "GET",
            "/trades?dateFrom=2024-06-01T00:00:00Z",
            None,
        ).await;
        assert_eq!(ids(&body), vec!["L"]);

        let (_, body) = send(
            create_router(state),
            "GET",
            "/trades?start=2024-01-01T00:00:00Z&end=2024-01-01T00:00:00Z",
            None,
        ).await;
        assert_eq!(ids(&body), vec!["E"]);
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let state = seeded().await;

        let (status, body) = send(create_router(state.clone()), "GET", "/trades/search?search=alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec!["T1"]);
        assert_eq!(body["count"], 1);

        let (_, body) = send(create_router(state.clone()), "GET", "/trades/search?search=150.0", None).await;
        assert_eq!(ids(&body), vec!["T1"]);

        let (_, body) = send(create_router(state.clone()), "GET", "/trades/search?instrumentId=tsla", None).await;
        assert_eq!(ids(&body), vec!["T2"]);

        let (_, body) = send(create_router(state.clone()), "GET", "/trades/search?trader=nobody", None).await;
        assert_eq!(body["count"], 0);

        let (status, _) = send(create_router(state), "GET", "/trades/search", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_keeps_position_and_path_id() {
        let state = seeded().await;
        let mut replacement = trade_json("", "NVDA", "Erin", "BUY", 120.0, 7);
        replacement.as_object_mut().unwrap().remove("tradeId");
        replacement.as_object_mut().unwrap().remove("counterparty");

        let (status, body) = send(create_router(state.clone()), "PUT", "/trades/T2", Some(replacement)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tradeId"], "T2");

        let stored = state.store.get_by_id("T2").unwrap();
        assert_eq!(stored.trader, "Erin");
        assert_eq!(stored.counterparty, None);

        let (_, body) = send(create_router(state), "GET", "/trades", None).await;
        assert_eq!(ids(&body), vec!["T1", "T2", "T3"]);
    }

    #[tokio::test]
    async fn test_update_can_rename() {
        let state = seeded().await;
        let replacement = trade_json("T2-B", "TSLA", "Bob", "SELL", 710.0, 5);

        let (status, _) = send(create_router(state.clone()), "PUT", "/trades/T2", Some(replacement)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.store.get_by_id("T2").is_none());
        assert_eq!(state.store.get_by_id("T2-B").unwrap().trader, "Bob");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let state = seeded().await;
        let replacement = trade_json("T9", "TSLA", "Bob", "SELL", 710.0, 5);

        let (status, body) = send(create_router(state), "PUT", "/trades/T9", Some(replacement)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let state = seeded().await;

        let (status, body) = send(create_router(state.clone()), "DELETE", "/trades/T1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = send(create_router(state.clone()), "GET", "/trades/T1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(create_router(state), "DELETE", "/trades/T1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
