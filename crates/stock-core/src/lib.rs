//! # Stock Core
//!
//! 일별 시세 파이프라인의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 심볼, 시세, 저장 레코드, 실행 요약
//! - 이동평균/등락률/이상치 계산 (순수 함수)
//! - 외부 협력자 추상화 (심볼 카탈로그, 시세 소스, 히스토리 저장소, 알림)
//! - 파이프라인 설정
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
