//! 헬스 체크 endpoint.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::state::{AppState, LastRun};

/// `GET /health/ready` 응답.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// "ready" | "degraded"
    pub status: &'static str,
    pub version: String,
    pub uptime_secs: i64,
    /// "up" | "down" | "not_configured"
    pub database: &'static str,
    /// 마지막 HTTP 트리거 실행 결과
    pub last_run: Option<LastRun>,
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// 데이터베이스 연결과 마지막 실행 결과를 보고합니다.
/// 데이터베이스가 설정되어 있는데 응답하지 않으면 503입니다.
///
/// GET /health/ready
pub async fn health_ready(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match &state.database {
        None => "not_configured",
        Some(_) if state.is_db_healthy().await => "up",
        Some(_) => "down",
    };

    let (status, code) = if database == "down" {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    } else {
        ("ready", StatusCode::OK)
    };

    let response = ReadinessResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        database,
        last_run: state.last_run().await,
    };

    (code, Json(response))
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
