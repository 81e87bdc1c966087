//! 파이프라인 메트릭 헬퍼.
//!
//! 레코더가 설치되지 않은 경우 (CLI 단발 실행 등) 기록은 무시됩니다.

use metrics::{counter, histogram};

use crate::stats::RunStats;

/// 실행 결과 카운터 증가 (`completed` / `failed`).
pub fn record_run(status: &'static str) {
    counter!("pipeline_runs_total", "status" => status).increment(1);
}

/// 실행 통계를 심볼 단위 카운터와 소요 시간 히스토그램으로 기록합니다.
pub fn record_stats(stats: &RunStats) {
    counter!("pipeline_symbols_total", "outcome" => "processed").increment(stats.success as u64);
    counter!("pipeline_symbols_total", "outcome" => "failed").increment(stats.errors as u64);
    counter!("pipeline_symbols_total", "outcome" => "timed_out").increment(stats.timed_out as u64);
    counter!("pipeline_anomalies_total").increment(stats.anomalies as u64);
    histogram!("pipeline_run_duration_seconds").record(stats.elapsed.as_secs_f64());
}
