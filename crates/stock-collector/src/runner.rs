//! 파이프라인 실행기.
//!
//! 한 번의 실행은 다음 순서로 진행됩니다:
//! 1. 심볼 카탈로그 조회 (실패 시 실행 전체 실패)
//! 2. 심볼별 시세 조회 → 히스토리 조회 → 지표 계산 (실패는 심볼 단위로 격리)
//! 3. 이상치 알림
//! 4. 계산된 레코드를 한 번에 저장
//!
//! 동시 처리 수가 1보다 크면 심볼 작업을 동시에 진행하지만,
//! 결과는 카탈로그 위치별 슬롯에 모아 카탈로그 순서로 정리하므로 저장 배치 순서는 결정적입니다.

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn, Instrument};

use stock_core::{
    symbol_span, AlertSink, FetchError, HistoryStore, HistoryWindow, MetricsEngine, MetricsError,
    NoopAlertSink, PipelineResult, PipelineSettings, QuoteSource, RunError, RunSummary,
    StockRecord, Symbol, SymbolCatalog,
};

use crate::metrics;
use crate::stats::RunStats;

/// 마감 시간 초과로 처리하지 못한 심볼의 에러 메시지.
pub const DEADLINE_EXCEEDED: &str = "run deadline exceeded";

/// 심볼 단위 실패. 메시지는 원인 에러 그대로 요약에 기록됩니다.
#[derive(Debug, Error)]
enum SymbolError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

type SymbolOutcome = Result<StockRecord, SymbolError>;

/// 일별 시세 파이프라인 실행기.
///
/// 외부 협력자는 모두 생성 시 주입되며, 실행기 자체는 실행 간 상태를 갖지 않습니다.
pub struct PipelineRunner {
    catalog: Arc<dyn SymbolCatalog>,
    quotes: Arc<dyn QuoteSource>,
    store: Arc<dyn HistoryStore>,
    alerts: Arc<dyn AlertSink>,
    engine: MetricsEngine,
    window_size: usize,
    concurrency: usize,
    deadline: Option<Duration>,
}

impl PipelineRunner {
    /// 새 실행기를 생성합니다. 알림 수신자는 기본적으로 no-op입니다.
    pub fn new(
        catalog: Arc<dyn SymbolCatalog>,
        quotes: Arc<dyn QuoteSource>,
        store: Arc<dyn HistoryStore>,
        settings: &PipelineSettings,
    ) -> Self {
        Self {
            catalog,
            quotes,
            store,
            alerts: Arc::new(NoopAlertSink),
            engine: MetricsEngine::new(settings.anomaly_threshold),
            window_size: settings.window_size.max(1),
            concurrency: settings.concurrency.max(1),
            deadline: settings.deadline(),
        }
    }

    /// 이상치 알림 수신자를 설정합니다.
    pub fn with_alert_sink(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    /// 실행 마감 시간을 설정합니다. `None`이면 제한이 없습니다.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 파이프라인을 한 번 실행합니다.
    ///
    /// 심볼 카탈로그 조회 실패만 `Err`로 반환하며,
    /// 나머지 실패는 모두 요약의 `errors`에 기록됩니다.
    pub async fn run(&self) -> PipelineResult<RunSummary> {
        self.run_with_stats().await.map(|(summary, _)| summary)
    }

    /// 파이프라인을 실행하고 요약과 함께 실행 통계를 반환합니다.
    pub async fn run_with_stats(&self) -> PipelineResult<(RunSummary, RunStats)> {
        let started = Instant::now();
        let mut stats = RunStats::new();

        let symbols = match self.catalog.list().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(error = %e, "심볼 목록 조회 실패, 실행 중단");
                metrics::record_run("failed");
                return Err(e.into());
            }
        };
        stats.total = symbols.len();

        info!(
            symbols = symbols.len(),
            source = self.quotes.name(),
            concurrency = self.concurrency,
            "파이프라인 실행 시작"
        );

        let run_date = Utc::now().date_naive();
        let slots = self.process_all(&symbols, run_date).await;

        let mut processed = Vec::with_capacity(symbols.len());
        let mut pending = Vec::with_capacity(symbols.len());
        let mut errors = Vec::new();

        for (symbol, slot) in symbols.iter().zip(slots) {
            match slot {
                Some(Ok(record)) => {
                    processed.push(symbol.clone());
                    pending.push(record);
                }
                Some(Err(e)) => {
                    stats.errors += 1;
                    errors.push(RunError::new(symbol.clone(), e.to_string()));
                }
                None => {
                    stats.timed_out += 1;
                    errors.push(RunError::new(symbol.clone(), DEADLINE_EXCEEDED));
                }
            }
        }

        if stats.timed_out > 0 {
            warn!(
                completed = symbols.len() - stats.timed_out,
                remaining = stats.timed_out,
                "실행 마감 시간 초과, 완료된 레코드만 저장"
            );
        }
        stats.success = pending.len();

        self.dispatch_alerts(&pending, &mut stats).await;
        self.persist(&pending, &mut errors, &mut stats).await;

        stats.elapsed = started.elapsed();
        metrics::record_run("completed");
        metrics::record_stats(&stats);

        let summary = RunSummary::new(processed, errors);
        info!(
            total_processed = summary.total_processed(),
            errors = summary.errors().len(),
            "파이프라인 실행 완료"
        );

        Ok((summary, stats))
    }

    /// 모든 심볼을 처리하고 카탈로그 위치별 결과 슬롯을 반환합니다.
    ///
    /// 완료 순서와 관계없이 결과를 받아 위치에 기록합니다.
    /// 마감 시간이 지나면 진행 중인 작업은 버려지고 해당 슬롯은 `None`으로 남습니다.
    async fn process_all(
        &self,
        symbols: &[Symbol],
        run_date: NaiveDate,
    ) -> Vec<Option<SymbolOutcome>> {
        let total = symbols.len();
        let results = stream::iter(symbols.iter().enumerate())
            .map(|(idx, symbol)| {
                let progress = format!("{}/{}", idx + 1, total);
                let span = symbol_span!("symbol", symbol, progress);
                async move { (idx, self.process_symbol(symbol, run_date).await) }.instrument(span)
            })
            .buffer_unordered(self.concurrency)
            .boxed();
        let mut results = std::pin::pin!(results);

        let deadline = self.deadline.map(|d| tokio::time::Instant::now() + d);
        let mut slots: Vec<Option<SymbolOutcome>> =
            std::iter::repeat_with(|| None).take(total).collect();

        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, results.next()).await {
                    Ok(next) => next,
                    Err(_) => break,
                },
                None => results.next().await,
            };

            match next {
                Some((idx, outcome)) => slots[idx] = Some(outcome),
                None => break,
            }
        }

        slots
    }

    /// 한 심볼의 시세를 조회하고 지표를 계산하여 레코드를 만듭니다.
    ///
    /// 히스토리 조회 실패는 빈 히스토리로 취급합니다.
    async fn process_symbol(&self, symbol: &Symbol, run_date: NaiveDate) -> SymbolOutcome {
        let quote = self.quotes.fetch(symbol).await.map_err(|e| {
            warn!(error = %e, "시세 조회 실패");
            e
        })?;

        let (window, previous_close) = tokio::join!(
            self.store.read_recent_closes(symbol, self.window_size),
            self.store.read_most_recent_close(symbol),
        );

        let window = window.unwrap_or_else(|e| {
            warn!(error = %e, "최근 종가 조회 실패, 빈 히스토리로 계산");
            HistoryWindow::empty()
        });
        let previous_close = previous_close.unwrap_or_else(|e| {
            warn!(error = %e, "직전 종가 조회 실패, 등락률 0으로 계산");
            None
        });

        let derived = self
            .engine
            .derive(quote.close, &window, previous_close)
            .map_err(|e| {
                warn!(error = %e, close = %quote.close, "지표 계산 실패");
                e
            })?;

        debug!(
            close = %quote.close,
            volume = quote.volume,
            history = window.len(),
            moving_average = %derived.moving_average,
            percent_change = %derived.percent_change,
            "지표 계산 완료"
        );

        Ok(StockRecord {
            symbol: symbol.clone(),
            date: run_date,
            close: quote.close,
            volume: quote.volume,
            moving_average: derived.moving_average,
            percent_change: derived.percent_change,
            is_anomaly: derived.is_anomaly,
            computed_at: Utc::now(),
        })
    }

    /// 이상치 레코드마다 알림을 한 번씩 전송합니다. 실패는 로그만 남깁니다.
    async fn dispatch_alerts(&self, records: &[StockRecord], stats: &mut RunStats) {
        for record in records.iter().filter(|r| r.is_anomaly) {
            stats.anomalies += 1;
            warn!(
                symbol = %record.symbol,
                percent_change = %record.percent_change,
                close = %record.close,
                "이상치 감지"
            );

            if let Err(e) = self.alerts.notify_anomaly(record).await {
                warn!(symbol = %record.symbol, error = %e, "이상치 알림 전송 실패");
            }
        }
    }

    /// 계산된 레코드를 한 번에 저장하고 실패를 에러 목록에 추가합니다.
    async fn persist(&self, records: &[StockRecord], errors: &mut Vec<RunError>, stats: &mut RunStats) {
        if records.is_empty() {
            debug!("저장할 레코드 없음");
            return;
        }

        match self.store.append_batch(records).await {
            Ok(rejected) => {
                stats.persist_failed = rejected.len();
                stats.persisted = records.len() - rejected.len();
                for e in rejected {
                    error!(symbol = %e.symbol, index = e.index, error = %e.message, "레코드 저장 실패");
                    errors.push(RunError::new(e.symbol, e.message));
                }
            }
            Err(e) => {
                error!(error = %e, records = records.len(), "배치 저장 실패");
                stats.persist_failed = records.len();
                let message = e.to_string();
                errors.extend(
                    records
                        .iter()
                        .map(|r| RunError::new(r.symbol.clone(), message.clone())),
                );
            }
        }
    }
}
