//! 시세 파이프라인 API 서버.
//!
//! Axum 기반 HTTP 서버를 시작합니다.
//! 파이프라인 실행 트리거, 헬스 체크, 서비스 정보, 메트릭 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use stock_api::metrics::setup_metrics_recorder;
use stock_api::middleware::metrics_layer;
use stock_api::routes::create_api_router;
use stock_api::state::AppState;
use stock_collector::{bootstrap, CollectorConfig};
use stock_core::logging::{init_logging, LogConfig};

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
    /// 요청 타임아웃 (초)
    request_timeout_secs: u64,
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let request_timeout_secs = std::env::var("API_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(600);

        Self {
            host,
            port,
            request_timeout_secs,
        }
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    init_logging(LogConfig::from_env(
        "stock_api=info,stock_collector=info,stock_data=info,stock_notification=info,tower_http=info",
    ))?;

    info!("Starting Stock API server...");

    let metrics_handle = setup_metrics_recorder();
    info!("Prometheus metrics recorder initialized");

    let server_config = ServerConfig::from_env();
    let config = CollectorConfig::from_env()?;

    let database = bootstrap::connect_database(&config).await?;
    let notifier = Arc::new(bootstrap::build_notifier());
    let runner = bootstrap::build_pg_runner(&config, &database, notifier)?;

    let state = Arc::new(AppState::new(Arc::new(runner)).with_database(database.clone()));
    let app = create_router(
        state,
        metrics_handle,
        Duration::from_secs(server_config.request_timeout_secs),
    );

    let addr = server_config.socket_addr()?;
    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    database.pool().close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    // 메트릭 라우터 (별도 상태)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router().with_state(state))
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 실행이 오래 걸릴 수 있으므로 파이프라인 마감 시간보다 길게 설정
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}

/// Prometheus 메트릭 렌더링.
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// Graceful shutdown 시그널 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
