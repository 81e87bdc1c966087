//! 실행 요약.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::types::Symbol;

/// 심볼 단위 실패 기록.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    /// 실패한 심볼
    pub symbol: Symbol,
    /// 실패 사유
    pub message: String,
}

impl RunError {
    pub fn new(symbol: Symbol, message: impl Into<String>) -> Self {
        Self {
            symbol,
            message: message.into(),
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol, self.message)
    }
}

/// `"SYMBOL: message"` 문자열로 직렬화합니다.
impl Serialize for RunError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 한 번의 파이프라인 실행 결과.
///
/// `total_processed`는 항상 `processed_symbols`의 길이와 같습니다.
/// 일부 심볼이 실패해도 실행은 성공으로 보고되므로, 호출자는 `errors`를 확인해야 합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    processed_symbols: Vec<Symbol>,
    errors: Vec<RunError>,
    total_processed: usize,
}

impl RunSummary {
    /// 처리된 심볼과 에러 목록으로 요약을 생성합니다.
    pub fn new(processed_symbols: Vec<Symbol>, errors: Vec<RunError>) -> Self {
        let total_processed = processed_symbols.len();
        Self {
            processed_symbols,
            errors,
            total_processed,
        }
    }

    /// 처리된 심볼 (카탈로그 순서)
    pub fn processed_symbols(&self) -> &[Symbol] {
        &self.processed_symbols
    }

    /// 실패 목록 (발생 순서)
    pub fn errors(&self) -> &[RunError] {
        &self.errors
    }

    /// 처리된 심볼 수
    pub fn total_processed(&self) -> usize {
        self.total_processed
    }

    /// 하나 이상의 에러가 있는 실행인지 확인합니다.
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_matches_processed() {
        let summary = RunSummary::new(
            vec![Symbol::new("AAA"), Symbol::new("CCC")],
            vec![RunError::new(Symbol::new("BBB"), "Network error: refused")],
        );

        assert_eq!(summary.total_processed(), 2);
        assert!(summary.is_degraded());
    }

    #[test]
    fn test_summary_wire_format() {
        let summary = RunSummary::new(
            vec![Symbol::new("AAA")],
            vec![RunError::new(Symbol::new("BBB"), "timeout")],
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "processed_symbols": ["AAA"],
                "errors": ["BBB: timeout"],
                "total_processed": 1
            })
        );
    }
}
