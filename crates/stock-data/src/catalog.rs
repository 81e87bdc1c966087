//! 심볼 카탈로그 구현.
//!
//! - `PgSymbolCatalog`: `tracked_stocks` 테이블에서 추적 대상 조회
//! - `StaticSymbolCatalog`: CLI 인자 등으로 고정된 목록

use async_trait::async_trait;
use sqlx::PgPool;

use stock_core::{CatalogError, Symbol, SymbolCatalog};

use crate::error::DataError;

/// `tracked_stocks` 테이블 기반 카탈로그.
#[derive(Clone)]
pub struct PgSymbolCatalog {
    pool: PgPool,
}

impl PgSymbolCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SymbolCatalog for PgSymbolCatalog {
    async fn list(&self) -> Result<Vec<Symbol>, CatalogError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT symbol
            FROM tracked_stocks
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DataError::from)?;

        let symbols: Vec<Symbol> = rows.into_iter().map(|(s,)| Symbol::new(s)).collect();
        tracing::debug!(count = symbols.len(), "추적 심볼 조회 완료");
        Ok(symbols)
    }
}

/// 고정 심볼 목록 카탈로그.
#[derive(Debug, Clone, Default)]
pub struct StaticSymbolCatalog {
    symbols: Vec<Symbol>,
}

impl StaticSymbolCatalog {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// 쉼표로 구분된 목록에서 생성합니다 (예: "RELIANCE,TCS").
    pub fn parse(list: &str) -> Self {
        Self::new(Symbol::parse_list(list))
    }
}

#[async_trait]
impl SymbolCatalog for StaticSymbolCatalog {
    async fn list(&self) -> Result<Vec<Symbol>, CatalogError> {
        Ok(self.symbols.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_catalog_preserves_order() {
        let catalog = StaticSymbolCatalog::parse("TCS, RELIANCE, INFY");
        let symbols = catalog.list().await.unwrap();
        let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["TCS", "RELIANCE", "INFY"]);
    }
}
