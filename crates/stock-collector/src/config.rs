//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use stock_core::{ApiCredentials, PipelineSettings};
use stock_data::{IndianApiClient, PreferredExchange};

use crate::error::CollectorError;
use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL (드라이런에서는 없어도 됨)
    pub database_url: Option<String>,
    /// 시세 API 설정
    pub quote_api: QuoteApiConfig,
    /// 파이프라인 실행 설정
    pub pipeline: PipelineSettings,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 시세 API 설정
#[derive(Debug, Clone)]
pub struct QuoteApiConfig {
    /// API 자격증명 (`STOCK_API_KEY`, 마이그레이션에는 필요 없음)
    pub credentials: Option<ApiCredentials>,
    /// API 기본 URL
    pub base_url: String,
    /// 선호 거래소
    pub exchange: PreferredExchange,
    /// 요청 타임아웃 (초, 0이면 비활성화)
    pub request_timeout_secs: u64,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 파이프라인 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let credentials = std::env::var("STOCK_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(ApiCredentials::new);

        let exchange = match std::env::var("STOCK_API_EXCHANGE") {
            Ok(value) => value.parse().map_err(CollectorError::Config)?,
            Err(_) => PreferredExchange::default(),
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            quote_api: QuoteApiConfig {
                credentials,
                base_url: std::env::var("STOCK_API_BASE_URL")
                    .unwrap_or_else(|_| stock_data::provider::DEFAULT_BASE_URL.to_string()),
                exchange,
                request_timeout_secs: env_var_parse("QUOTE_REQUEST_TIMEOUT_SECS", 30),
            },
            pipeline: PipelineSettings::from_env()?,
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 1440),
            },
        })
    }

    /// 데이터베이스 URL을 반환합니다. 없으면 설정 에러입니다.
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })
    }
}

impl QuoteApiConfig {
    /// 요청 타임아웃을 Duration으로 반환 (0이면 None)
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// 설정으로 시세 API 클라이언트를 생성합니다. API 키가 없으면 설정 에러입니다.
    pub fn build_client(&self) -> Result<IndianApiClient> {
        let credentials = self.credentials.clone().ok_or_else(|| {
            CollectorError::Config("STOCK_API_KEY 환경변수가 설정되지 않았습니다".to_string())
        })?;

        Ok(IndianApiClient::new(credentials)
            .with_base_url(&self.base_url)
            .with_exchange(self.exchange)
            .with_timeout(self.request_timeout()))
    }
}

impl DaemonConfig {
    /// 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1) * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_config(timeout: u64) -> QuoteApiConfig {
        QuoteApiConfig {
            credentials: Some(ApiCredentials::new("key")),
            base_url: "http://localhost:9999/".to_string(),
            exchange: PreferredExchange::Bse,
            request_timeout_secs: timeout,
        }
    }

    #[test]
    fn test_zero_timeout_disables() {
        assert_eq!(quote_config(0).request_timeout(), None);
        assert_eq!(
            quote_config(15).request_timeout(),
            Some(Duration::from_secs(15))
        );
    }

    #[test]
    fn test_build_client_applies_exchange() {
        let client = quote_config(5).build_client().unwrap();
        assert_eq!(client.exchange(), PreferredExchange::Bse);
        assert_eq!(client.timeout(), Some(Duration::from_secs(5)));

        let client = quote_config(0).build_client().unwrap();
        assert_eq!(client.timeout(), None);
    }

    #[test]
    fn test_build_client_requires_api_key() {
        let config = QuoteApiConfig {
            credentials: None,
            ..quote_config(5)
        };
        assert!(matches!(
            config.build_client(),
            Err(CollectorError::Config(_))
        ));
    }

    #[test]
    fn test_daemon_interval_has_floor() {
        let daemon = DaemonConfig {
            interval_minutes: 0,
        };
        assert_eq!(daemon.interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_env_var_parse_falls_back() {
        assert_eq!(env_var_parse("STOCK_COLLECTOR_TEST_UNSET_KEY", 42u64), 42);
    }
}
