//! 파이프라인 실행 설정.
//!
//! 이동평균 윈도우 크기와 이상치 임계값은 실행 설정으로 관리하며,
//! 기본값은 7일 / 3.0% 입니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 이동평균에 사용하는 과거 종가 수 기본값.
pub const DEFAULT_WINDOW_SIZE: usize = 7;

/// 이상치 판정 등락률 임계값 기본값 (%).
pub const DEFAULT_ANOMALY_THRESHOLD: Decimal = dec!(3.0);

/// 파이프라인 실행 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineSettings {
    /// 이동평균 계산에 사용할 최근 종가 수
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// 이상치 판정 임계값 (절대값 기준, 초과 시 이상치)
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: Decimal,
    /// 동시에 처리할 심볼 수 (1이면 순차 처리)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// 실행 전체 마감 시간 (초, 선택)
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_anomaly_threshold() -> Decimal {
    DEFAULT_ANOMALY_THRESHOLD
}

fn default_concurrency() -> usize {
    1
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
            concurrency: 1,
            deadline_secs: None,
        }
    }
}

impl PipelineSettings {
    /// `PIPELINE_` 접두사 환경 변수에서 설정을 로드합니다.
    ///
    /// 인식하는 키: `PIPELINE_WINDOW_SIZE`, `PIPELINE_ANOMALY_THRESHOLD`,
    /// `PIPELINE_CONCURRENCY`, `PIPELINE_DEADLINE_SECS`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("window_size", DEFAULT_WINDOW_SIZE as i64)?
            .set_default("anomaly_threshold", DEFAULT_ANOMALY_THRESHOLD.to_string())?
            .set_default("concurrency", 1)?
            // 환경 변수로 오버라이드
            .add_source(config::Environment::with_prefix("PIPELINE").try_parsing(true));

        let settings: Self = builder.build()?.try_deserialize()?;
        Ok(settings.normalized())
    }

    /// 윈도우 크기를 설정합니다.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// 이상치 임계값을 설정합니다.
    pub fn with_anomaly_threshold(mut self, threshold: Decimal) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    /// 동시 처리 수를 설정합니다.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// 실행 마감 시간을 설정합니다.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_secs = Some(deadline.as_secs());
        self
    }

    /// 실행 마감 시간을 Duration으로 반환
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// 0 이하 값을 안전한 최소값으로 보정합니다.
    fn normalized(mut self) -> Self {
        if self.window_size == 0 {
            tracing::warn!("PIPELINE_WINDOW_SIZE=0 은 허용되지 않아 1로 보정합니다");
            self.window_size = 1;
        }
        if self.concurrency == 0 {
            self.concurrency = 1;
        }
        self.anomaly_threshold = self.anomaly_threshold.abs();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.window_size, 7);
        assert_eq!(settings.anomaly_threshold, dec!(3.0));
        assert_eq!(settings.concurrency, 1);
        assert!(settings.deadline().is_none());
    }

    #[test]
    fn test_builder_methods() {
        let settings = PipelineSettings::default()
            .with_window_size(5)
            .with_anomaly_threshold(dec!(2.5))
            .with_concurrency(4)
            .with_deadline(Duration::from_secs(90));

        assert_eq!(settings.window_size, 5);
        assert_eq!(settings.anomaly_threshold, dec!(2.5));
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.deadline(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_normalized_guards_zero_values() {
        let settings = PipelineSettings {
            window_size: 0,
            anomaly_threshold: dec!(-3),
            concurrency: 0,
            deadline_secs: None,
        }
        .normalized();

        assert_eq!(settings.window_size, 1);
        assert_eq!(settings.concurrency, 1);
        assert_eq!(settings.anomaly_threshold, dec!(3));
    }
}
