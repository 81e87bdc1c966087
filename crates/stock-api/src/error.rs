//! API 에러 응답 타입.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use stock_core::PipelineError;

/// API 에러 응답.
///
/// ```json
/// {
///   "code": "CATALOG_UNAVAILABLE",
///   "message": "Symbol catalog unavailable: connection refused"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "CATALOG_UNAVAILABLE")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// 에러 코드 반환.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 에러 메시지 반환.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 실행 수준 에러를 HTTP 응답으로 변환합니다.
pub fn pipeline_error_response(err: PipelineError) -> (StatusCode, Json<ApiErrorResponse>) {
    let code = match &err {
        PipelineError::Catalog(_) => "CATALOG_UNAVAILABLE",
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new(code, err.to_string())),
    )
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;
