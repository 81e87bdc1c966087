//! 파이프라인 알림 연결.
//!
//! [`NotificationManager`]는 여러 전송기로 알림을 전파하고,
//! [`NotificationAlertSink`]는 전송기를 파이프라인의 [`AlertSink`]로 노출합니다.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::error;

use stock_core::{AlertError, AlertSink, RunSummary, StockRecord};

use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationPriority, NotificationResult,
    NotificationSender,
};

/// 여러 전송기를 관리하는 알림 관리자.
#[derive(Default)]
pub struct NotificationManager {
    senders: Vec<Box<dyn NotificationSender>>,
}

impl NotificationManager {
    /// 새 알림 관리자를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 알림 전송기를 추가합니다.
    pub fn add_sender<S: NotificationSender + 'static>(&mut self, sender: S) {
        self.senders.push(Box::new(sender));
    }

    /// 빌더 형태로 전송기를 추가합니다.
    pub fn with_sender<S: NotificationSender + 'static>(mut self, sender: S) -> Self {
        self.add_sender(sender);
        self
    }

    /// 등록된 전송기 이름 목록
    pub fn sender_names(&self) -> Vec<&str> {
        self.senders.iter().map(|s| s.name()).collect()
    }

    /// 실행 요약에 에러가 있으면 알림을 전송합니다.
    pub async fn notify_run_degraded(&self, summary: &RunSummary) -> NotificationResult<()> {
        if !summary.is_degraded() {
            return Ok(());
        }

        let notification = Notification::new(NotificationEvent::RunDegraded {
            total_processed: summary.total_processed(),
            errors: summary.errors().iter().map(ToString::to_string).collect(),
        });
        self.send(&notification).await
    }

    /// 실행 전체 실패 알림을 전송합니다.
    pub async fn notify_run_failed(&self, message: &str) -> NotificationResult<()> {
        let notification = Notification::new(NotificationEvent::RunFailed {
            message: message.to_string(),
        })
        .with_priority(NotificationPriority::Critical);
        self.send(&notification).await
    }
}

#[async_trait]
impl NotificationSender for NotificationManager {
    /// 활성화된 모든 전송기에 동시에 전송합니다.
    ///
    /// 모든 전송기가 실패한 경우에만 마지막 에러를 반환합니다.
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        let enabled: Vec<_> = self.senders.iter().filter(|s| s.is_enabled()).collect();
        if enabled.is_empty() {
            return Ok(());
        }

        let results = join_all(enabled.iter().map(|s| s.send(notification))).await;

        let mut last_error: Option<NotificationError> = None;
        let mut delivered = 0usize;
        for (sender, result) in enabled.iter().zip(results) {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    error!(sender = sender.name(), error = %e, "Failed to send notification");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if delivered == 0 => Err(e),
            _ => Ok(()),
        }
    }

    fn is_enabled(&self) -> bool {
        self.senders.iter().any(|s| s.is_enabled())
    }

    fn name(&self) -> &str {
        "manager"
    }
}

/// 전송기를 파이프라인 알림 수신자로 연결하는 어댑터.
pub struct NotificationAlertSink<S> {
    sender: S,
}

impl<S: NotificationSender> NotificationAlertSink<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    /// 내부 전송기
    pub fn sender(&self) -> &S {
        &self.sender
    }
}

#[async_trait]
impl<S: NotificationSender> AlertSink for NotificationAlertSink<S> {
    async fn notify_anomaly(&self, record: &StockRecord) -> Result<(), AlertError> {
        let notification = Notification::new(NotificationEvent::price_anomaly(record))
            .with_priority(NotificationPriority::High);
        self.sender.send(&notification).await.map_err(AlertError::from)
    }
}
