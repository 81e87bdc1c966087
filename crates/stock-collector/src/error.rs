//! 에러 타입 정의.

use thiserror::Error;

use stock_data::DataError;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 데이터베이스 에러
    #[error("Database error: {0}")]
    Database(#[from] DataError),

    /// 파이프라인 실행 에러
    #[error(transparent)]
    Pipeline(#[from] stock_core::PipelineError),
}

impl From<config::ConfigError> for CollectorError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
