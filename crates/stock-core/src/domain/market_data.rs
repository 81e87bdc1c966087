//! 시세 및 저장 레코드 타입.
//!
//! 이 모듈은 파이프라인이 주고받는 데이터 구조를 정의합니다:
//! - `Quote` - 실행마다 새로 조회한 시세
//! - `HistoryWindow` - 심볼별 최근 종가 스냅샷 (최신순)
//! - `StockRecord` - 실행당 심볼별로 한 건씩 추가되는 저장 단위

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Symbol;

/// 한 시점의 가격/거래량 관측값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 종목 심볼
    pub symbol: Symbol,
    /// 종가 (양수)
    pub close: Decimal,
    /// 거래량
    pub volume: i64,
    /// 관측 시각
    pub observed_at: DateTime<Utc>,
    /// 제공자가 보고한 등락률 (참고용, 지표 계산에는 사용하지 않음)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_change_pct: Option<Decimal>,
}

impl Quote {
    /// 새 시세를 생성합니다.
    pub fn new(symbol: Symbol, close: Decimal, volume: i64, observed_at: DateTime<Utc>) -> Self {
        Self {
            symbol,
            close,
            volume,
            observed_at,
            provider_change_pct: None,
        }
    }

    /// 제공자 등락률을 설정합니다.
    pub fn with_provider_change_pct(mut self, change_pct: Option<Decimal>) -> Self {
        self.provider_change_pct = change_pct;
        self
    }
}

/// 심볼별 최근 종가 목록 (최신순).
///
/// 신규 심볼이거나 저장소를 읽을 수 없으면 비어 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryWindow {
    closes: Vec<Decimal>,
}

impl HistoryWindow {
    /// 빈 윈도우를 생성합니다.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 최신순 종가 목록에서 윈도우를 생성합니다. `limit`개를 넘는 값은 버립니다.
    pub fn from_closes(mut closes: Vec<Decimal>, limit: usize) -> Self {
        closes.truncate(limit);
        Self { closes }
    }

    /// 최신순 종가 슬라이스
    pub fn closes(&self) -> &[Decimal] {
        &self.closes
    }

    /// 가장 최근 종가
    pub fn most_recent(&self) -> Option<Decimal> {
        self.closes.first().copied()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// 저장 단위 레코드.
///
/// 실행당 심볼별로 한 건씩 추가 전용(append-only)으로 저장됩니다.
/// 같은 날 다시 실행하면 같은 심볼/날짜에 두 번째 레코드가 생깁니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// 종목 심볼
    pub symbol: Symbol,
    /// 실행 기준 일자
    pub date: NaiveDate,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: i64,
    /// 이동평균 (과거 윈도우 + 당일 종가)
    #[serde(rename = "ma_7day")]
    pub moving_average: Decimal,
    /// 직전 종가 대비 등락률 (%)
    pub percent_change: Decimal,
    /// 이상치 여부
    pub is_anomaly: bool,
    /// 계산 시각
    #[serde(rename = "timestamp")]
    pub computed_at: DateTime<Utc>,
}
