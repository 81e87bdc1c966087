//! 서비스 정보 endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// `GET /` 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

/// 서비스 이름, 버전, 엔드포인트 목록을 반환합니다.
pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "stock-pipeline".to_string(),
        version: state.version.clone(),
        endpoints: ["POST /run", "GET /run", "GET /health", "GET /health/ready", "GET /metrics"]
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}
