//! 메모리 기반 히스토리 저장소.
//!
//! 데이터베이스 없이 실행하는 `--dry-run` 모드와 테스트에서 사용합니다.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use stock_core::{HistoryStore, HistoryWindow, PersistenceError, StockRecord, StoreError, Symbol};

/// 프로세스 메모리에 레코드를 보관하는 추가 전용 저장소.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<StockRecord>>,
    rejected_symbols: RwLock<HashSet<Symbol>>,
    unavailable: AtomicBool,
    reads_failing: AtomicBool,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 과거 종가를 미리 채워 넣습니다.
    ///
    /// `closes`는 최신순이며, 첫 번째 값이 `latest` 일자, 이후 값은 하루씩 이전 일자로 저장됩니다.
    pub fn with_history(
        mut self,
        symbol: impl Into<Symbol>,
        closes: &[Decimal],
        latest: NaiveDate,
    ) -> Self {
        let symbol = symbol.into();
        let computed_at = Utc::now();
        let records = self.records.get_mut();

        // 오래된 것부터 추가하여 삽입 순서도 시간 순서와 맞춤
        for (age, close) in closes.iter().enumerate().rev() {
            records.push(StockRecord {
                symbol: symbol.clone(),
                date: latest - Duration::days(age as i64),
                close: *close,
                volume: 0,
                moving_average: *close,
                percent_change: Decimal::ZERO,
                is_anomaly: false,
                computed_at,
            });
        }
        self
    }

    /// 지정한 심볼의 레코드를 행 단위로 거부하도록 설정합니다.
    pub async fn reject_symbol(&self, symbol: impl Into<Symbol>) {
        self.rejected_symbols.write().await.insert(symbol.into());
    }

    /// 저장소 전체 접근 불가 상태를 설정합니다.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 조회만 실패하도록 설정합니다. 저장은 계속 동작합니다.
    pub fn set_reads_failing(&self, failing: bool) {
        self.reads_failing.store(failing, Ordering::SeqCst);
    }

    /// 저장된 레코드 스냅샷 (삽입 순서)
    pub async fn records(&self) -> Vec<StockRecord> {
        self.records.read().await.clone()
    }

    /// 심볼의 레코드를 최신순으로 반환합니다.
    ///
    /// (date, computed_at) 내림차순이며, 같은 키는 나중에 추가된 레코드가 먼저 옵니다.
    async fn newest_first(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Decimal>, StoreError> {
        self.check_available()?;
        if self.reads_failing.load(Ordering::SeqCst) {
            return Err(StoreError::Query("in-memory reads disabled".to_string()));
        }

        let records = self.records.read().await;
        let mut matching: Vec<&StockRecord> =
            records.iter().rev().filter(|r| &r.symbol == symbol).collect();
        matching.sort_by(|a, b| (b.date, b.computed_at).cmp(&(a.date, a.computed_at)));

        Ok(matching.into_iter().take(limit).map(|r| r.close).collect())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store marked unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn read_recent_closes(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<HistoryWindow, StoreError> {
        let closes = self.newest_first(symbol, limit).await?;
        Ok(HistoryWindow::from_closes(closes, limit))
    }

    async fn read_most_recent_close(&self, symbol: &Symbol) -> Result<Option<Decimal>, StoreError> {
        Ok(self.newest_first(symbol, 1).await?.into_iter().next())
    }

    async fn append_batch(
        &self,
        records: &[StockRecord],
    ) -> Result<Vec<PersistenceError>, StoreError> {
        self.check_available()?;

        let rejected_symbols = self.rejected_symbols.read().await;
        let mut stored = self.records.write().await;
        let mut rejected = Vec::new();

        for (index, record) in records.iter().enumerate() {
            if rejected_symbols.contains(&record.symbol) {
                rejected.push(PersistenceError::new(
                    index,
                    record.symbol.clone(),
                    "row rejected by store",
                ));
            } else {
                stored.push(record.clone());
            }
        }

        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(symbol: &str, date: NaiveDate, close: Decimal) -> StockRecord {
        StockRecord {
            symbol: Symbol::new(symbol),
            date,
            close,
            volume: 10,
            moving_average: close,
            percent_change: Decimal::ZERO,
            is_anomaly: false,
            computed_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_with_history_reads_newest_first() {
        let store = InMemoryHistoryStore::new().with_history(
            "TCS",
            &[dec!(103), dec!(102), dec!(101)],
            day(10),
        );

        let window = store.read_recent_closes(&Symbol::new("TCS"), 7).await.unwrap();
        assert_eq!(window.closes(), &[dec!(103), dec!(102), dec!(101)]);

        let window = store.read_recent_closes(&Symbol::new("TCS"), 2).await.unwrap();
        assert_eq!(window.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty() {
        let store = InMemoryHistoryStore::new();
        let symbol = Symbol::new("NEW");

        assert!(store.read_recent_closes(&symbol, 7).await.unwrap().is_empty());
        assert_eq!(store.read_most_recent_close(&symbol).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_same_day_records_latest_insert_wins() {
        let store = InMemoryHistoryStore::new();
        store.append_batch(&[record("INFY", day(3), dec!(100))]).await.unwrap();
        store.append_batch(&[record("INFY", day(3), dec!(110))]).await.unwrap();

        let latest = store.read_most_recent_close(&Symbol::new("INFY")).await.unwrap();
        assert_eq!(latest, Some(dec!(110)));
        assert_eq!(store.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_rows_are_reported() {
        let store = InMemoryHistoryStore::new();
        store.reject_symbol("BAD").await;

        let errors = store
            .append_batch(&[
                record("GOOD", day(1), dec!(1)),
                record("BAD", day(1), dec!(2)),
            ])
            .await
            .unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, 1);
        assert_eq!(errors[0].symbol, Symbol::new("BAD"));
        assert_eq!(store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = InMemoryHistoryStore::new();
        store.set_unavailable(true);

        let err = store
            .append_batch(&[record("TCS", day(1), dec!(1))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.read_recent_closes(&Symbol::new("TCS"), 7).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_reads_keep_writes_working() {
        let store = InMemoryHistoryStore::new().with_history("TCS", &[dec!(100)], day(1));
        store.set_reads_failing(true);

        let err = store.read_most_recent_close(&Symbol::new("TCS")).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));

        let rejected = store
            .append_batch(&[record("TCS", day(2), dec!(101))])
            .await
            .unwrap();
        assert!(rejected.is_empty());
        assert_eq!(store.records().await.len(), 2);
    }
}
