//! 알림 타입 및 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stock_core::{AlertError, StockRecord};

/// 알림 우선순위 레벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// 일반 우선순위 (일반 업데이트)
    #[default]
    Normal,
    /// 높은 우선순위 (중요 이벤트)
    High,
    /// 긴급 우선순위 (즉시 대응 필요)
    Critical,
}

/// 가격 변동 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Up,
    Down,
}

impl PriceDirection {
    /// 등락률 부호로 방향을 결정합니다. 0은 상승으로 취급합니다.
    pub fn from_change(percent_change: Decimal) -> Self {
        if percent_change.is_sign_negative() && !percent_change.is_zero() {
            Self::Down
        } else {
            Self::Up
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// 알림 이벤트 타입.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// 등락률 이상치
    PriceAnomaly {
        symbol: String,
        date: NaiveDate,
        close: Decimal,
        percent_change: Decimal,
        moving_average: Decimal,
    },
    /// 일부 심볼이 실패한 실행
    RunDegraded {
        total_processed: usize,
        errors: Vec<String>,
    },
    /// 실행 전체 실패 (심볼 카탈로그 조회 불가)
    RunFailed { message: String },
}

impl NotificationEvent {
    /// 저장 레코드에서 이상치 이벤트를 생성합니다.
    pub fn price_anomaly(record: &StockRecord) -> Self {
        Self::PriceAnomaly {
            symbol: record.symbol.to_string(),
            date: record.date,
            close: record.close,
            percent_change: record.percent_change,
            moving_average: record.moving_average,
        }
    }

    /// 서식 없는 한 줄 요약.
    ///
    /// 이상치의 경우 심볼, 방향, 소수점 둘째 자리의 등락률 절대값, 종가, 일자를 포함합니다.
    pub fn plain_text(&self) -> String {
        match self {
            Self::PriceAnomaly {
                symbol,
                date,
                close,
                percent_change,
                ..
            } => {
                let direction = PriceDirection::from_change(*percent_change);
                format!(
                    "{symbol} moved {} {:.2}% (close {close}, {date})",
                    direction.as_str(),
                    percent_change.abs().round_dp(2)
                )
            }
            Self::RunDegraded {
                total_processed,
                errors,
            } => format!(
                "pipeline run completed with {} error(s), {total_processed} symbol(s) processed",
                errors.len()
            ),
            Self::RunFailed { message } => format!("pipeline run failed: {message}"),
        }
    }
}

/// 알림 메시지.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// 고유 알림 ID
    pub id: String,
    /// 알림 이벤트
    pub event: NotificationEvent,
    /// 우선순위 레벨
    pub priority: NotificationPriority,
    /// 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// 새 알림을 생성합니다.
    pub fn new(event: NotificationEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event,
            priority: NotificationPriority::Normal,
            timestamp: Utc::now(),
        }
    }

    /// 우선순위 레벨을 설정합니다.
    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl From<NotificationError> for AlertError {
    fn from(err: NotificationError) -> Self {
        AlertError(err.to_string())
    }
}

/// 알림 전송기 trait.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 알림을 전송합니다.
    async fn send(&self, notification: &Notification) -> NotificationResult<()>;

    /// 전송기가 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: NotificationSender + ?Sized> NotificationSender for std::sync::Arc<T> {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        (**self).send(notification).await
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn anomaly(pct: Decimal) -> NotificationEvent {
        NotificationEvent::PriceAnomaly {
            symbol: "RELIANCE".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            close: dec!(2950.5),
            percent_change: pct,
            moving_average: dec!(2900),
        }
    }

    #[test]
    fn test_direction_from_change() {
        assert_eq!(PriceDirection::from_change(dec!(4.2)), PriceDirection::Up);
        assert_eq!(PriceDirection::from_change(dec!(-4.2)), PriceDirection::Down);
        assert_eq!(PriceDirection::from_change(Decimal::ZERO), PriceDirection::Up);
    }

    #[test]
    fn test_anomaly_plain_text() {
        let text = anomaly(dec!(-4.56789)).plain_text();
        assert_eq!(text, "RELIANCE moved down 4.57% (close 2950.5, 2024-06-03)");

        let text = anomaly(dec!(5)).plain_text();
        assert!(text.contains("moved up 5.00%"));
    }

    #[test]
    fn test_notification_error_into_alert_error() {
        let err: AlertError = NotificationError::RateLimited(60).into();
        assert!(err.0.contains("60"));
    }
}
