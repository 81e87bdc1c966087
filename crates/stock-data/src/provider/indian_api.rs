//! Indian Stock API 클라이언트.
//!
//! 종목별 현재 시세(종가, 거래량, 등락률)를 조회합니다.
//!
//! # 응답 정규화
//!
//! 제공자 응답은 필드 구성이 일정하지 않습니다:
//! - 거래소별 중첩: `{"currentPrice": {"NSE": "2950.10", "BSE": "2949.80"}}`
//! - 평면 필드: `{"close": 2950.1, "volume": 120000}`
//!
//! 종가는 `currentPrice.{선호 거래소}` → `currentPrice.{다른 거래소}` → `close`
//! → 스칼라 `currentPrice` 순으로 찾습니다. 기본 선호 거래소는 NSE입니다.
//! 거래량이 없거나 숫자가 아니면 0으로 처리합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use stock_core::{ApiCredentials, QuoteSource, Symbol};
//! use stock_data::provider::IndianApiClient;
//!
//! let client = IndianApiClient::new(ApiCredentials::new("YOUR_API_KEY"));
//! let quote = client.fetch(&Symbol::new("RELIANCE")).await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

use stock_core::{ApiCredentials, FetchError, Quote, QuoteSource, Symbol};

/// 기본 API 주소.
pub const DEFAULT_BASE_URL: &str = "https://stock.indianapi.in";

/// 기본 요청 타임아웃 (초).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 에러 메시지에 포함할 응답 본문 최대 길이.
const MAX_ERROR_BODY_LEN: usize = 200;

/// 가격 필드를 고를 때 우선할 거래소.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferredExchange {
    /// National Stock Exchange
    #[default]
    Nse,
    /// Bombay Stock Exchange
    Bse,
}

impl PreferredExchange {
    /// 응답 JSON의 거래소 키
    pub fn key(&self) -> &'static str {
        match self {
            Self::Nse => "NSE",
            Self::Bse => "BSE",
        }
    }

    /// 선호 거래소가 없을 때 사용할 다른 거래소
    pub fn fallback(&self) -> Self {
        match self {
            Self::Nse => Self::Bse,
            Self::Bse => Self::Nse,
        }
    }
}

impl FromStr for PreferredExchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NSE" => Ok(Self::Nse),
            "BSE" => Ok(Self::Bse),
            other => Err(format!("Unknown exchange: {}", other)),
        }
    }
}

/// Indian Stock API 클라이언트.
#[derive(Clone)]
pub struct IndianApiClient {
    client: reqwest::Client,
    timeout: Option<Duration>,
    credentials: ApiCredentials,
    base_url: String,
    exchange: PreferredExchange,
}

impl IndianApiClient {
    /// 새로운 클라이언트 생성 (기본 타임아웃 30초).
    ///
    /// # Arguments
    /// * `credentials` - `X-Api-Key` 헤더로 전달할 API 자격증명
    pub fn new(credentials: ApiCredentials) -> Self {
        Self {
            client: build_http_client(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            exchange: PreferredExchange::default(),
        }
    }

    /// 환경변수 `STOCK_API_KEY`에서 API 키를 읽어 클라이언트 생성.
    pub fn from_env() -> Option<Self> {
        std::env::var("STOCK_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(ApiCredentials::new(key)))
    }

    /// API 주소를 변경합니다 (끝의 `/`는 제거).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// 선호 거래소를 변경합니다.
    pub fn with_exchange(mut self, exchange: PreferredExchange) -> Self {
        self.exchange = exchange;
        self
    }

    /// 요청 타임아웃을 변경합니다. `None`이면 타임아웃을 두지 않습니다.
    ///
    /// 타임아웃은 요청마다 적용되므로 HTTP 클라이언트를 다시 만들지 않습니다.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 요청 타임아웃
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// 선호 거래소
    pub fn exchange(&self) -> PreferredExchange {
        self.exchange
    }

    /// 시세 API 요청 실행.
    ///
    /// API 키는 `X-Api-Key` 헤더로, 심볼은 `name` 쿼리 파라미터로 전달합니다.
    async fn request(&self, symbol: &Symbol) -> Result<Value, FetchError> {
        let url = format!("{}/stock", self.base_url);

        tracing::debug!(symbol = %symbol, url = %url, "시세 API 요청");

        let mut request = self
            .client
            .get(&url)
            .query(&[("name", symbol.as_str())])
            .header("X-Api-Key", self.credentials.api_key())
            .header("Accept", "application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY_LEN);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::InvalidPayload(e.to_string()))
    }
}

#[async_trait]
impl QuoteSource for IndianApiClient {
    fn name(&self) -> &str {
        "indian-stock-api"
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        let payload = self.request(symbol).await?;
        normalize_quote(symbol, &payload, self.exchange)
    }
}

/// 제공자 응답을 [`Quote`]로 정규화합니다.
pub fn normalize_quote(
    symbol: &Symbol,
    payload: &Value,
    exchange: PreferredExchange,
) -> Result<Quote, FetchError> {
    if !payload.is_object() {
        return Err(FetchError::InvalidPayload(format!(
            "expected JSON object, got {}",
            json_type_name(payload)
        )));
    }

    let close_field = find_close_field(payload, exchange)
        .ok_or_else(|| FetchError::MissingField("close".to_string()))?;

    // 숫자로 읽을 수 없는 값은 0으로 취급
    let close = parse_decimal_value(close_field).unwrap_or_default();
    if close <= Decimal::ZERO {
        return Err(FetchError::InvalidPayload(format!(
            "close must be positive, got {}",
            close
        )));
    }

    let volume = payload
        .get("volume")
        .and_then(parse_decimal_value)
        .and_then(|v| v.trunc().to_i64())
        .unwrap_or(0)
        .max(0);

    let provider_change_pct = payload.get("percentChange").and_then(parse_decimal_value);

    Ok(Quote::new(symbol.clone(), close, volume, Utc::now())
        .with_provider_change_pct(provider_change_pct))
}

/// 종가 필드를 선호 거래소 순서대로 찾습니다.
fn find_close_field(payload: &Value, exchange: PreferredExchange) -> Option<&Value> {
    let nested = payload.get("currentPrice").filter(|v| v.is_object());

    nested
        .and_then(|prices| prices.get(exchange.key()))
        .or_else(|| nested.and_then(|prices| prices.get(exchange.fallback().key())))
        .or_else(|| payload.get("close"))
        .or_else(|| payload.get("currentPrice").filter(|v| !v.is_object()))
        .filter(|v| !v.is_null())
}

/// JSON 값을 Decimal로 파싱 (숫자 또는 쉼표/퍼센트가 포함된 문자열).
fn parse_decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        Value::String(s) => parse_decimal_str(&s.replace([',', '%'], "")),
        _ => None,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn map_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else {
        FetchError::Network(err.to_string())
    }
}

/// 옵션 없는 기본 클라이언트. 생성자에서 한 번만 호출됩니다.
fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .expect("HTTP 클라이언트 생성 실패")
}

fn truncate_at_char_boundary(s: &mut String, max_len: usize) {
    if s.len() <= max_len {
        return;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn symbol() -> Symbol {
        Symbol::new("RELIANCE")
    }

    #[test]
    fn test_normalize_prefers_nse() {
        let payload = json!({
            "currentPrice": {"NSE": "2,950.10", "BSE": "2949.80"},
            "volume": 120000,
            "percentChange": "1.25%"
        });

        let quote = normalize_quote(&symbol(), &payload, PreferredExchange::Nse).unwrap();
        assert_eq!(quote.close, dec!(2950.10));
        assert_eq!(quote.volume, 120000);
        assert_eq!(quote.provider_change_pct, Some(dec!(1.25)));
    }

    #[test]
    fn test_normalize_falls_back_to_other_exchange() {
        let payload = json!({"currentPrice": {"BSE": 2949.8}});

        let quote = normalize_quote(&symbol(), &payload, PreferredExchange::Nse).unwrap();
        assert_eq!(quote.close, dec!(2949.8));
        assert_eq!(quote.volume, 0);
    }

    #[test]
    fn test_normalize_flat_fields() {
        let payload = json!({"close": 101.5, "volume": "2,500"});

        let quote = normalize_quote(&symbol(), &payload, PreferredExchange::Bse).unwrap();
        assert_eq!(quote.close, dec!(101.5));
        assert_eq!(quote.volume, 2500);
        assert_eq!(quote.provider_change_pct, None);
    }

    #[test]
    fn test_normalize_missing_close() {
        let payload = json!({"volume": 10});
        let err = normalize_quote(&symbol(), &payload, PreferredExchange::Nse).unwrap_err();
        assert!(matches!(err, FetchError::MissingField(ref f) if f == "close"));
    }

    #[test]
    fn test_normalize_unparseable_close_is_rejected() {
        let payload = json!({"currentPrice": {"NSE": "N/A"}});
        let err = normalize_quote(&symbol(), &payload, PreferredExchange::Nse).unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload(_)));
    }

    #[test]
    fn test_normalize_non_object_payload() {
        let err = normalize_quote(&symbol(), &json!([1, 2]), PreferredExchange::Nse).unwrap_err();
        assert_eq!(err.to_string(), "Invalid payload: expected JSON object, got array");
    }

    #[test]
    fn test_preferred_exchange_from_str() {
        assert_eq!("nse".parse::<PreferredExchange>().unwrap(), PreferredExchange::Nse);
        assert_eq!("BSE".parse::<PreferredExchange>().unwrap(), PreferredExchange::Bse);
        assert!("NYSE".parse::<PreferredExchange>().is_err());
    }

    #[tokio::test]
    async fn test_fetch_sends_key_and_symbol() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::UrlEncoded("name".into(), "RELIANCE".into()))
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"currentPrice": {"NSE": 2950.1}, "volume": 5}"#)
            .create_async()
            .await;

        let client = IndianApiClient::new(ApiCredentials::new("test-key"))
            .with_base_url(format!("{}/", server.url()));
        let quote = client.fetch(&symbol()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(quote.symbol, symbol());
        assert_eq!(quote.close, dec!(2950.1));
        assert_eq!(quote.volume, 5);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let client =
            IndianApiClient::new(ApiCredentials::new("test-key")).with_base_url(server.url());
        let err = client.fetch(&symbol()).await.unwrap_err();

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "Too Many Requests");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client =
            IndianApiClient::new(ApiCredentials::new("test-key")).with_base_url(server.url());
        let err = client.fetch(&symbol()).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        let client = IndianApiClient::new(ApiCredentials::new("test-key"))
            .with_base_url("http://127.0.0.1:1");
        let err = client.fetch(&symbol()).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_applied_per_request() {
        let client = IndianApiClient::new(ApiCredentials::new("test-key"));
        assert_eq!(client.timeout(), Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));

        let client = client
            .with_timeout(None)
            .with_base_url("http://127.0.0.1:1");
        assert_eq!(client.timeout(), None);

        let client = client.with_timeout(Some(Duration::from_millis(200)));
        let err = client.fetch(&symbol()).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_) | FetchError::Timeout(_)));
    }
}
