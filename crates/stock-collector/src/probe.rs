//! 시세 API 연결 점검.
//!
//! 저장소에 쓰지 않고 심볼별로 한 번씩 시세를 조회하여 정규화 결과를 확인합니다.

use stock_core::{Quote, QuoteSource, Symbol};

/// 한 심볼의 점검 결과.
#[derive(Debug)]
pub struct ProbeResult {
    pub symbol: Symbol,
    pub outcome: Result<Quote, String>,
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// `Success` 또는 `Failed - 사유` 형식의 상태 문자열.
    pub fn status_line(&self) -> String {
        match &self.outcome {
            Ok(_) => format!("{}: Success", self.symbol),
            Err(message) => format!("{}: Failed - {}", self.symbol, message),
        }
    }
}

/// 심볼마다 시세를 한 번씩 조회합니다.
pub async fn probe_quotes(source: &dyn QuoteSource, symbols: &[Symbol]) -> Vec<ProbeResult> {
    let mut results = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let outcome = source.fetch(symbol).await.map_err(|e| e.to_string());
        match &outcome {
            Ok(quote) => tracing::info!(
                symbol = %symbol,
                close = %quote.close,
                volume = quote.volume,
                provider_change_pct = ?quote.provider_change_pct,
                "시세 조회 성공"
            ),
            Err(e) => tracing::warn!(symbol = %symbol, error = %e, "시세 조회 실패"),
        }
        results.push(ProbeResult {
            symbol: symbol.clone(),
            outcome,
        });
    }

    results
}
