//! HTTP 라우트 통합 테스트.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal_macros::dec;
use tower::ServiceExt;

use stock_api::{create_api_router, AppState};
use stock_collector::PipelineRunner;
use stock_core::{
    CatalogError, FetchError, PipelineSettings, Quote, QuoteSource, Symbol, SymbolCatalog,
};
use stock_data::{InMemoryHistoryStore, StaticSymbolCatalog};

/// `AAA`만 시세를 돌려주고 나머지는 네트워크 에러를 내는 시세 소스.
struct OnlyAaa;

#[async_trait]
impl QuoteSource for OnlyAaa {
    fn name(&self) -> &str {
        "only-aaa"
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        if symbol.as_str() == "AAA" {
            Ok(Quote::new(symbol.clone(), dec!(100), 500, Utc::now()))
        } else {
            Err(FetchError::Network("connection refused".to_string()))
        }
    }
}

/// 시세 응답이 10초 걸리는 소스.
struct SlowQuotes;

#[async_trait]
impl QuoteSource for SlowQuotes {
    fn name(&self) -> &str {
        "slow"
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(Quote::new(symbol.clone(), dec!(42), 100, Utc::now()))
    }
}

struct BrokenCatalog;

#[async_trait]
impl SymbolCatalog for BrokenCatalog {
    async fn list(&self) -> Result<Vec<Symbol>, CatalogError> {
        Err(CatalogError::Unavailable("pool timed out".to_string()))
    }
}

fn app(catalog: Arc<dyn SymbolCatalog>) -> (Router, Arc<InMemoryHistoryStore>) {
    let store = Arc::new(InMemoryHistoryStore::new());
    let runner = PipelineRunner::new(
        catalog,
        Arc::new(OnlyAaa),
        store.clone(),
        &PipelineSettings::default(),
    );
    let state = Arc::new(AppState::new(Arc::new(runner)));
    (create_api_router().with_state(state), store)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_post_run_returns_summary() {
    let (app, store) = app(Arc::new(StaticSymbolCatalog::parse("AAA,BBB")));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "processed_symbols": ["AAA"],
            "errors": ["BBB: Network error: connection refused"],
            "total_processed": 1
        })
    );
    assert_eq!(store.records().await.len(), 1);
}

#[tokio::test]
async fn test_get_run_is_also_accepted() {
    let (app, _) = app(Arc::new(StaticSymbolCatalog::parse("AAA")));

    let response = app
        .oneshot(Request::builder().uri("/run").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total_processed"], 1);
}

#[tokio::test]
async fn test_catalog_failure_returns_500() {
    let (app, store) = app(Arc::new(BrokenCatalog));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "CATALOG_UNAVAILABLE");
    assert!(body["message"].as_str().unwrap().contains("pool timed out"));
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn test_health_returns_ok_text() {
    let (app, _) = app(Arc::new(StaticSymbolCatalog::parse("AAA")));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_health_ready_reports_last_run() {
    let (app, _) = app(Arc::new(StaticSymbolCatalog::parse("AAA,BBB")));
    let ready = || Request::builder().uri("/health/ready").body(Body::empty()).unwrap();

    let response = app.clone().oneshot(ready()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "not_configured");
    assert!(body["last_run"].is_null());

    let run = Request::builder()
        .method(Method::POST)
        .uri("/run")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.clone().oneshot(run).await.unwrap().status(), StatusCode::OK);

    let body = body_json(app.oneshot(ready()).await.unwrap()).await;
    assert_eq!(body["last_run"]["total_processed"], 1);
    assert_eq!(body["last_run"]["errors"], 1);
}

#[tokio::test]
async fn test_service_descriptor() {
    let (app, _) = app(Arc::new(StaticSymbolCatalog::parse("AAA")));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "stock-pipeline");
    assert!(!body["version"].as_str().unwrap().is_empty());
    assert!(body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e == "POST /run"));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_request_still_completes_batch_write() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let runner = PipelineRunner::new(
        Arc::new(StaticSymbolCatalog::parse("AAA,BBB")),
        Arc::new(SlowQuotes),
        store.clone(),
        &PipelineSettings::default(),
    );
    let state = Arc::new(AppState::new(Arc::new(runner)));
    let app = create_api_router().with_state(state.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/run")
        .body(Body::empty())
        .unwrap();
    let dropped = tokio::time::timeout(Duration::from_secs(5), app.oneshot(request)).await;
    assert!(dropped.is_err());
    assert!(store.records().await.is_empty());

    // 실행 태스크가 끝나 잠금이 풀릴 때까지 대기
    drop(state.lock_run().await);

    let stored: Vec<String> = store
        .records()
        .await
        .into_iter()
        .map(|r| r.symbol.to_string())
        .collect();
    assert_eq!(stored, vec!["AAA", "BBB"]);
}
