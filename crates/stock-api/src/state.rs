//! API 서버 공유 상태.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use stock_collector::PipelineRunner;
use stock_core::RunSummary;
use stock_data::Database;

/// 마지막 HTTP 트리거 실행 결과.
#[derive(Debug, Clone, Serialize)]
pub struct LastRun {
    pub finished_at: DateTime<Utc>,
    pub total_processed: usize,
    pub errors: usize,
}

impl LastRun {
    pub fn from_summary(summary: &RunSummary) -> Self {
        Self {
            finished_at: Utc::now(),
            total_processed: summary.total_processed(),
            errors: summary.errors().len(),
        }
    }
}

/// 핸들러가 공유하는 애플리케이션 상태.
pub struct AppState {
    /// 파이프라인 실행기
    pub runner: Arc<PipelineRunner>,
    /// 데이터베이스 (readiness 확인용, 없으면 미설정)
    pub database: Option<Database>,
    /// 서비스 버전
    pub version: String,
    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
    /// 실행 직렬화 잠금. 실행 태스크가 소유권을 가져가 요청이 끊겨도 끝까지 유지됩니다.
    run_lock: Arc<Mutex<()>>,
    last_run: RwLock<Option<LastRun>>,
}

impl AppState {
    /// 새 상태를 생성합니다.
    pub fn new(runner: Arc<PipelineRunner>) -> Self {
        Self {
            runner,
            database: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            run_lock: Arc::new(Mutex::new(())),
            last_run: RwLock::new(None),
        }
    }

    /// readiness 확인에 사용할 데이터베이스를 설정합니다.
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// 서버 업타임(초)
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.database {
            Some(db) => db.health_check().await.unwrap_or(false),
            None => false,
        }
    }

    /// 실행 잠금을 획득합니다. 진행 중인 실행이 끝날 때까지 대기합니다.
    pub async fn lock_run(&self) -> OwnedMutexGuard<()> {
        self.run_lock.clone().lock_owned().await
    }

    /// 마지막 실행 결과를 기록합니다.
    pub async fn record_run(&self, summary: &RunSummary) {
        *self.last_run.write().await = Some(LastRun::from_summary(summary));
    }

    /// 마지막 실행 결과 (아직 실행 전이면 `None`)
    pub async fn last_run(&self) -> Option<LastRun> {
        self.last_run.read().await.clone()
    }
}
