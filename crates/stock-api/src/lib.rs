//! 시세 파이프라인 HTTP 서버.
//!
//! 파이프라인 1회 실행 트리거와 헬스 체크, 서비스 정보, Prometheus 메트릭을 제공합니다.

pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
