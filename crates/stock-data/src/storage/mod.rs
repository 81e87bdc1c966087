//! 레코드 저장소.
//!
//! `stock_records` 테이블은 추가 전용입니다. `(symbol, date)` 고유 제약이 없으므로
//! 같은 날 두 번 실행하면 같은 심볼/날짜에 레코드가 두 건 쌓입니다.

pub mod memory;
pub mod postgres;
