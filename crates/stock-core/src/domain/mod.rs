//! 일별 시세 파이프라인 도메인 모델.

mod market_data;
mod metrics;
mod ports;
mod summary;

pub use market_data::*;
pub use metrics::*;
pub use ports::*;
pub use summary::*;
