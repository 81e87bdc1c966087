//! 이동평균, 등락률, 이상치 판정.
//!
//! 모든 함수는 부수효과가 없는 순수 함수입니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::market_data::HistoryWindow;
use crate::config::DEFAULT_ANOMALY_THRESHOLD;
use crate::error::MetricsError;

/// 단순 이동평균.
///
/// 윈도우가 비어 있으면 당일 종가를 그대로 반환하고,
/// 그렇지 않으면 `윈도우 종가 ++ [당일 종가]`의 가중치 없는 산술평균을 반환합니다.
/// 표본 크기는 1 이상 (윈도우 크기 + 1) 이하입니다.
pub fn moving_average(window: &HistoryWindow, new_close: Decimal) -> Result<Decimal, MetricsError> {
    if window.is_empty() {
        return Ok(new_close);
    }

    let overflow = || MetricsError::Overflow("moving average");
    let sum = window
        .closes()
        .iter()
        .try_fold(new_close, |acc, close| acc.checked_add(*close))
        .ok_or_else(overflow)?;
    sum.checked_div(Decimal::from(window.len() + 1))
        .ok_or_else(overflow)
}

/// 직전 종가 대비 등락률 (%).
///
/// 직전 종가가 없거나 0이면 0을 반환합니다.
/// 윈도우 평균이 아닌 단일 직전 종가를 기준으로 계산합니다.
pub fn percent_change(
    new_close: Decimal,
    previous_close: Option<Decimal>,
) -> Result<Decimal, MetricsError> {
    let prev = match previous_close {
        Some(prev) if !prev.is_zero() => prev,
        _ => return Ok(Decimal::ZERO),
    };

    new_close
        .checked_sub(prev)
        .and_then(|diff| diff.checked_div(prev))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or(MetricsError::Overflow("percent change"))
}

/// 이상치 판정: `|등락률| > 임계값` (경계값은 이상치가 아님).
pub fn is_anomaly(percent_change: Decimal, threshold: Decimal) -> bool {
    percent_change.abs() > threshold
}

/// 시세와 히스토리에서 계산한 파생 지표.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedMetrics {
    /// 이동평균
    pub moving_average: Decimal,
    /// 직전 종가 대비 등락률 (%)
    pub percent_change: Decimal,
    /// 이상치 여부
    pub is_anomaly: bool,
}

/// 파생 지표 계산기.
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine {
    anomaly_threshold: Decimal,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ANOMALY_THRESHOLD)
    }
}

impl MetricsEngine {
    /// 이상치 임계값을 지정하여 계산기를 생성합니다.
    pub fn new(anomaly_threshold: Decimal) -> Self {
        Self { anomaly_threshold }
    }

    /// 이상치 임계값
    pub fn anomaly_threshold(&self) -> Decimal {
        self.anomaly_threshold
    }

    /// 당일 종가, 최근 윈도우, 직전 종가로 세 지표를 계산합니다.
    ///
    /// 계산이 Decimal 범위를 넘으면 해당 심볼만 실패하도록 에러를 반환합니다.
    pub fn derive(
        &self,
        close: Decimal,
        window: &HistoryWindow,
        previous_close: Option<Decimal>,
    ) -> Result<DerivedMetrics, MetricsError> {
        let pct = percent_change(close, previous_close)?;
        Ok(DerivedMetrics {
            moving_average: moving_average(window, close)?,
            percent_change: pct,
            is_anomaly: is_anomaly(pct, self.anomaly_threshold),
        })
    }
}
