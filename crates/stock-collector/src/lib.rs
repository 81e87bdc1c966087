//! 일별 시세 파이프라인 실행기.
//!
//! 이 crate는 파이프라인 실행기와 이를 구동하는 바이너리를 제공합니다:
//! - `PipelineRunner`: 심볼별 시세 조회, 지표 계산, 배치 저장
//! - 환경변수 기반 설정과 구성 요소 조립
//! - 실행 통계 및 메트릭
//! - 시세 API 연결 점검 (`probe`)

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod metrics;
pub mod probe;
pub mod runner;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use runner::{PipelineRunner, DEADLINE_EXCEEDED};
pub use stats::RunStats;
