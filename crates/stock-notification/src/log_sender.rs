//! 로그 알림 전송기.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::types::{Notification, NotificationPriority, NotificationResult, NotificationSender};

/// 알림을 tracing 이벤트로 남기는 전송기.
///
/// 외부 채널이 설정되지 않은 환경에서도 이상치가 로그에 남도록 항상 활성화됩니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        let text = notification.event.plain_text();
        match notification.priority {
            NotificationPriority::Normal => info!(id = %notification.id, "{}", text),
            NotificationPriority::High | NotificationPriority::Critical => {
                warn!(id = %notification.id, priority = ?notification.priority, "{}", text)
            }
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "log"
    }
}
