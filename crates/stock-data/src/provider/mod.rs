//! 시세 Provider 모듈.
//!
//! ## Indian Stock API
//! - `IndianApiClient`: NSE/BSE 상장 종목 시세 조회 (API 키 필요)
//! - 거래소별로 중첩된 가격 필드를 선호 거래소 기준으로 정규화

pub mod indian_api;

pub use indian_api::{IndianApiClient, PreferredExchange, DEFAULT_BASE_URL};
