//! 수집기 CLI와 API 서버가 공유하는 tracing 초기화.
//!
//! 개발 중에는 pretty 출력, 스케줄러/컨테이너에서는 `LOG_FORMAT=json`으로
//! 심볼 span 필드가 포함된 한 줄 JSON을 남깁니다.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시어 (예: "stock_collector=debug,stock_data=info")
    pub filter: String,
    pub format: LogFormat,
}

impl LogConfig {
    /// `RUST_LOG`가 없으면 `default_filter`를, `LOG_FORMAT`이 없거나 잘못되면 pretty를 사용합니다.
    pub fn from_env(default_filter: &str) -> Self {
        Self::from_values(
            std::env::var("RUST_LOG").ok(),
            std::env::var("LOG_FORMAT").ok(),
            default_filter,
        )
    }

    fn from_values(filter: Option<String>, format: Option<String>, default_filter: &str) -> Self {
        Self {
            filter: filter.unwrap_or_else(|| default_filter.to_string()),
            format: format.and_then(|f| f.parse().ok()).unwrap_or_default(),
        }
    }
}

/// 전역 subscriber를 설치합니다. 두 번째 호출은 에러를 반환합니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(&config.filter)?;

    let (json, pretty) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json().with_current_span(true)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().pretty())),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(pretty)
        .try_init()?;

    tracing::debug!(format = ?config.format, filter = %config.filter, "로깅 초기화 완료");
    Ok(())
}

/// 심볼 처리 span. 실행기에서 심볼별 로그에 `symbol`, `progress` 필드를 붙입니다.
#[macro_export]
macro_rules! symbol_span {
    ($name:expr, $symbol:expr) => {
        tracing::info_span!($name, symbol = %$symbol)
    };
    ($name:expr, $symbol:expr, $progress:expr) => {
        tracing::info_span!($name, symbol = %$symbol, progress = %$progress)
    };
}
