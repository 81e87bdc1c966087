//! 실행 통계 구조체.

use serde::Serialize;
use std::time::Duration;

/// 파이프라인 실행 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// 카탈로그의 심볼 수
    pub total: usize,
    /// 레코드 계산 성공 수
    pub success: usize,
    /// 시세 조회 실패 수
    pub errors: usize,
    /// 마감 시간 초과로 처리하지 못한 수
    pub timed_out: usize,
    /// 이상치 수
    pub anomalies: usize,
    /// 저장 성공 수
    pub persisted: usize,
    /// 저장 실패 수
    pub persist_failed: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            timed_out = self.timed_out,
            anomalies = self.anomalies,
            persisted = self.persisted,
            persist_failed = self.persist_failed,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let stats = RunStats {
            total: 4,
            success: 3,
            ..Default::default()
        };
        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
        assert_eq!(RunStats::new().success_rate(), 0.0);
    }
}
