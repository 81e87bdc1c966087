//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/` - 서비스 정보
//! - `/run` - 파이프라인 1회 실행 (POST, GET)
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//!
//! `/metrics`는 Prometheus 핸들을 상태로 갖는 별도 라우터로 서버에서 합쳐집니다.

pub mod health;
pub mod run;
pub mod service;

pub use health::{health_router, ReadinessResponse};
pub use run::run_pipeline;
pub use service::{service_info, ServiceInfo};

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .route("/run", get(run_pipeline).post(run_pipeline))
        .nest("/health", health_router())
}
