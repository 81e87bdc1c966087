//! 심볼 정의.
//!
//! 심볼은 시세 제공자가 이해하는 불투명한 식별자(예: `RELIANCE`, `TCS`)입니다.
//! 카탈로그 내에서 유일하며, 대소문자를 포함해 받은 그대로 보존합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 추적 대상 종목 심볼.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// 새 심볼을 생성합니다. 앞뒤 공백은 제거됩니다.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self(value.trim().to_string())
    }

    /// 심볼 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 쉼표로 구분된 심볼 목록을 파싱합니다 (예: "RELIANCE, TCS").
    ///
    /// 빈 항목은 무시하고, 중복은 처음 등장한 위치만 유지합니다.
    pub fn parse_list(s: &str) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = Vec::new();
        for part in s.split(',') {
            let symbol = Symbol::new(part);
            if symbol.0.is_empty() || symbols.contains(&symbol) {
                continue;
            }
            symbols.push(symbol);
        }
        symbols
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_opaque() {
        let symbol = Symbol::new("  Reliance ");
        assert_eq!(symbol.as_str(), "Reliance");
        assert_eq!(symbol.to_string(), "Reliance");
    }

    #[test]
    fn test_parse_list() {
        let symbols = Symbol::parse_list("RELIANCE, TCS,,INFY,TCS");
        let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["RELIANCE", "TCS", "INFY"]);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Symbol::new("TCS")).unwrap();
        assert_eq!(json, "\"TCS\"");
    }
}
