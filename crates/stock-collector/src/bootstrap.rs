//! 실행 구성 요소 조립.
//!
//! CLI와 API 서버가 같은 방식으로 실행기를 구성하도록 공통 생성 함수를 제공합니다.

use std::sync::Arc;

use stock_core::{HistoryStore, SymbolCatalog};
use stock_data::{Database, DatabaseConfig, PgSymbolCatalog};
use stock_notification::{LogSender, NotificationAlertSink, NotificationManager, TelegramSender};

use crate::config::CollectorConfig;
use crate::runner::PipelineRunner;
use crate::Result;

/// 설정의 `DATABASE_URL`로 데이터베이스에 연결합니다.
pub async fn connect_database(config: &CollectorConfig) -> Result<Database> {
    let url = config.require_database_url()?;
    let database = Database::connect(&DatabaseConfig::new(url)).await?;
    tracing::info!("데이터베이스 연결 성공");
    Ok(database)
}

/// 알림 관리자를 생성합니다.
///
/// 로그 전송기는 항상 등록되고, 텔레그램은 관련 환경변수가 있을 때만 등록됩니다.
pub fn build_notifier() -> NotificationManager {
    let mut manager = NotificationManager::new().with_sender(LogSender);
    if let Some(telegram) = TelegramSender::from_env() {
        manager.add_sender(telegram);
    }
    tracing::debug!(senders = ?manager.sender_names(), "알림 전송기 구성 완료");
    manager
}

/// 주어진 카탈로그와 저장소로 실행기를 구성합니다.
pub fn build_runner(
    config: &CollectorConfig,
    catalog: Arc<dyn SymbolCatalog>,
    store: Arc<dyn HistoryStore>,
    notifier: Arc<NotificationManager>,
) -> Result<PipelineRunner> {
    let quotes = Arc::new(config.quote_api.build_client()?);
    Ok(PipelineRunner::new(catalog, quotes, store, &config.pipeline)
        .with_alert_sink(Arc::new(NotificationAlertSink::new(notifier))))
}

/// PostgreSQL 카탈로그와 저장소로 실행기를 구성합니다.
pub fn build_pg_runner(
    config: &CollectorConfig,
    database: &Database,
    notifier: Arc<NotificationManager>,
) -> Result<PipelineRunner> {
    let catalog = Arc::new(PgSymbolCatalog::new(database.pool().clone()));
    let store = Arc::new(database.history_store());
    build_runner(config, catalog, store, notifier)
}
