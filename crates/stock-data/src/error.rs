//! 데이터 모듈 오류 타입.

use stock_core::{CatalogError, StoreError};
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DataError {
    /// 저장소 자체에 접근할 수 없는 오류인지 확인합니다.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DataError::ConnectionError(_) | DataError::PoolExhausted)
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DataError::PoolExhausted,
            sqlx::Error::Io(e) => DataError::ConnectionError(e.to_string()),
            sqlx::Error::Tls(e) => DataError::ConnectionError(e.to_string()),
            sqlx::Error::Database(db_err) => DataError::QueryError(db_err.message().to_string()),
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<DataError> for StoreError {
    fn from(err: DataError) -> Self {
        if err.is_unavailable() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Query(err.to_string())
        }
    }
}

impl From<DataError> for CatalogError {
    fn from(err: DataError) -> Self {
        if err.is_unavailable() {
            CatalogError::Unavailable(err.to_string())
        } else {
            CatalogError::Query(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
