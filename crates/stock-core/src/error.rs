//! 파이프라인 에러 타입.
//!
//! 에러는 실패 범위에 따라 나뉩니다:
//! - [`CatalogError`]: 실행 전체를 중단시키는 유일한 에러
//! - [`FetchError`]: 심볼 단위로 격리되어 요약에 기록됨
//! - [`PersistenceError`]: 배치 저장 중 거부된 개별 행
//! - [`StoreError`]: 저장소 자체에 접근할 수 없는 경우

use thiserror::Error;

use crate::types::Symbol;

/// 심볼 카탈로그 조회 에러.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 저장소 연결 불가
    #[error("Symbol catalog unavailable: {0}")]
    Unavailable(String),

    /// 쿼리 실행 실패
    #[error("Symbol catalog query failed: {0}")]
    Query(String),
}

/// 시세 조회 에러.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 성공이 아닌 HTTP 상태 코드
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 필수 필드 누락
    #[error("Missing field: {0}")]
    MissingField(String),

    /// 잘못된 응답 형식
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// 배치 저장 중 거부된 행.
#[derive(Debug, Clone, Error)]
#[error("Row {index} ({symbol}) rejected: {message}")]
pub struct PersistenceError {
    /// 배치 내 행 위치
    pub index: usize,
    /// 거부된 레코드의 심볼
    pub symbol: Symbol,
    /// 저장소가 보고한 사유
    pub message: String,
}

impl PersistenceError {
    /// 새 행 단위 저장 에러를 생성합니다.
    pub fn new(index: usize, symbol: Symbol, message: impl Into<String>) -> Self {
        Self {
            index,
            symbol,
            message: message.into(),
        }
    }
}

/// 히스토리 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 저장소 전체에 접근 불가
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// 쿼리 실행 실패
    #[error("Store query failed: {0}")]
    Query(String),
}

/// 알림 전송 에러.
/// 지표 계산 에러.
///
/// 종가 비율이 극단적이면 Decimal 표현 범위를 넘을 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("Metric overflow while computing {0}")]
    Overflow(&'static str),
}

#[derive(Debug, Error)]
#[error("Alert delivery failed: {0}")]
pub struct AlertError(pub String);

/// 실행 수준 에러.
///
/// 심볼 카탈로그를 읽지 못한 경우에만 실행이 실패합니다.
/// 나머지 에러는 모두 [`RunSummary`](crate::RunSummary)의 `errors`에 수집됩니다.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 심볼 목록 조회 실패 (치명적)
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// 파이프라인 실행 Result 타입.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let err: PipelineError = CatalogError::Unavailable("connection refused".into()).into();
        assert_eq!(
            err.to_string(),
            "Symbol catalog unavailable: connection refused"
        );
    }
}
