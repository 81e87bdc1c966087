//! 파이프라인이 소비하는 외부 협력자 trait 정의.
//!
//! 실행기는 전역 클라이언트 대신 생성 시 주입받은 구현체를 사용하므로
//! 테스트에서는 메모리 구현으로 대체할 수 있습니다.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::market_data::{HistoryWindow, Quote, StockRecord};
use crate::error::{AlertError, CatalogError, FetchError, PersistenceError, StoreError};
use crate::types::Symbol;

/// 추적 대상 심볼 목록 제공자.
#[async_trait]
pub trait SymbolCatalog: Send + Sync {
    /// 현재 추적 중인 심볼 목록을 순서대로 반환합니다.
    async fn list(&self) -> Result<Vec<Symbol>, CatalogError>;
}

/// 외부 시세 제공자.
///
/// 호출당 정확히 한 번의 외부 요청을 수행하며 재시도하지 않습니다.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// 제공자 이름 반환.
    fn name(&self) -> &str;

    /// 심볼의 현재 시세를 조회합니다.
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError>;
}

/// 추가 전용 레코드 저장소.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 최근 `limit`개의 종가를 최신순으로 조회합니다.
    ///
    /// 이전 레코드가 없으면 빈 윈도우를 반환합니다 (에러 아님).
    async fn read_recent_closes(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<HistoryWindow, StoreError>;

    /// 가장 최근 종가 하나를 조회합니다. `None`은 이전 레코드 없음을 뜻합니다.
    async fn read_most_recent_close(&self, symbol: &Symbol) -> Result<Option<Decimal>, StoreError>;

    /// 레코드를 한 번에 추가합니다.
    ///
    /// 일부 행이 거부되면 행 단위 에러 목록을 반환하고 (전체 성공 시 빈 목록),
    /// 저장소에 전혀 접근할 수 없을 때만 `Err`를 반환합니다.
    async fn append_batch(
        &self,
        records: &[StockRecord],
    ) -> Result<Vec<PersistenceError>, StoreError>;
}

/// 이상치 알림 수신자.
///
/// 이상치로 판정된 레코드마다 한 번 호출됩니다.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify_anomaly(&self, record: &StockRecord) -> Result<(), AlertError>;
}

/// 아무 동작도 하지 않는 기본 알림 수신자.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAlertSink;

#[async_trait]
impl AlertSink for NoopAlertSink {
    async fn notify_anomaly(&self, _record: &StockRecord) -> Result<(), AlertError> {
        Ok(())
    }
}
