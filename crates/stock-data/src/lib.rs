//! 시세 수집 데이터 계층.
//!
//! 이 crate는 다음을 제공합니다:
//! - 인도 주식 시세 API 클라이언트 (`QuoteSource` 구현)
//! - PostgreSQL 기반 심볼 카탈로그 및 추가 전용 레코드 저장소
//! - 테스트/드라이런용 메모리 저장소와 고정 심볼 카탈로그

pub mod catalog;
pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use catalog::{PgSymbolCatalog, StaticSymbolCatalog};
pub use provider::{IndianApiClient, PreferredExchange};
pub use storage::memory::InMemoryHistoryStore;
pub use storage::postgres::{Database, DatabaseConfig, PgHistoryStore};
