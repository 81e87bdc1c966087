//! # Stock Notification
//!
//! 시세 이상치 및 실행 결과 알림 서비스.
//!
//! 지원 채널:
//! - Telegram (Bot API)
//! - 로그 (tracing)
//!
//! [`NotificationAlertSink`]는 임의의 전송기를 파이프라인의 `AlertSink`로 연결합니다.

pub mod alert;
pub mod log_sender;
pub mod telegram;
pub mod types;

pub use alert::*;
pub use log_sender::*;
pub use telegram::*;
pub use types::*;
