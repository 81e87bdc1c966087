//! 텔레그램 알림 서비스.
//!
//! Telegram Bot API를 통해 시세 이상치와 실행 결과를 전송합니다.

use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationPriority, NotificationResult,
    NotificationSender, PriceDirection,
};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

/// 메시지에 나열할 최대 에러 수.
const MAX_LISTED_ERRORS: usize = 10;

/// 텔레그램 알림 전송 설정.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: String,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: String,
    /// 전송 활성화 여부
    pub enabled: bool,
    /// 파싱 모드 (HTML 또는 MarkdownV2)
    pub parse_mode: String,
    /// Bot API 기본 URL
    pub api_base_url: String,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            enabled: true,
            parse_mode: "HTML".to_string(),
            api_base_url: TELEGRAM_API_BASE_URL.to_string(),
        }
    }

    /// Bot API 기본 URL을 변경합니다.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// `TELEGRAM_BOT_TOKEN`과 `TELEGRAM_CHAT_ID`가 모두 있어야 합니다.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;
        let enabled = std::env::var("TELEGRAM_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        Some(Self {
            enabled,
            ..Self::new(bot_token, chat_id)
        })
    }
}

/// 텔레그램 알림 전송기.
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 환경 변수에서 전송기를 생성합니다.
    pub fn from_env() -> Option<Self> {
        TelegramConfig::from_env().map(Self::new)
    }

    /// 알림을 텔레그램 메시지로 포맷합니다.
    fn format_message(&self, notification: &Notification) -> String {
        let priority_emoji = match notification.priority {
            NotificationPriority::Normal => "📊",
            NotificationPriority::High => "⚠️",
            NotificationPriority::Critical => "🚨",
        };

        let content = match &notification.event {
            NotificationEvent::PriceAnomaly {
                symbol,
                date,
                close,
                percent_change,
                moving_average,
            } => {
                let direction = PriceDirection::from_change(*percent_change);
                let (emoji, label) = match direction {
                    PriceDirection::Up => ("🟢", "급등"),
                    PriceDirection::Down => ("🔴", "급락"),
                };
                let pct = percent_change.abs().round_dp(2);
                let ma = moving_average.round_dp(2);
                format!(
                    "{emoji} <b>가격 이상치 ({label})</b>\n\n\
                     심볼: <code>{symbol}</code>\n\
                     방향: {}\n\
                     변동률: <b>{pct:.2}%</b>\n\
                     종가: {close}\n\
                     이동평균: {ma}\n\
                     일자: {date}",
                    direction.as_str()
                )
            }

            NotificationEvent::RunDegraded {
                total_processed,
                errors,
            } => {
                let mut lines: Vec<String> = errors
                    .iter()
                    .take(MAX_LISTED_ERRORS)
                    .map(|e| format!("• <code>{}</code>", escape_html(e)))
                    .collect();
                if errors.len() > MAX_LISTED_ERRORS {
                    lines.push(format!("… 외 {}건", errors.len() - MAX_LISTED_ERRORS));
                }
                format!(
                    "{priority_emoji} <b>수집 일부 실패</b>\n\n\
                     처리: {total_processed}건\n\
                     실패: {}건\n\n{}",
                    errors.len(),
                    lines.join("\n")
                )
            }

            NotificationEvent::RunFailed { message } => {
                format!(
                    "{priority_emoji} <b>수집 실패</b>\n\n\
                     메시지: {}",
                    escape_html(message)
                )
            }
        };

        let timestamp = notification.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        format!("{content}\n\n<i>🕐 {timestamp}</i>")
    }

    /// 텔레그램에 원시 메시지를 전송합니다.
    async fn send_message(&self, text: &str) -> NotificationResult<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base_url, self.config.bot_token
        );

        let params = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": self.config.parse_mode,
            "disable_web_page_preview": true,
        });

        debug!(chat_id = %self.config.chat_id, "Sending Telegram message");

        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        if response.status().is_success() {
            info!("Telegram notification sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // 요청 한도 제한 확인
            if status.as_u16() == 429 {
                warn!("Telegram rate limited");
                return Err(NotificationError::RateLimited(60));
            }

            error!("Failed to send Telegram message: {} - {}", status, body);
            Err(NotificationError::SendFailed(format!(
                "HTTP {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("Telegram notifications are disabled, skipping");
            return Ok(());
        }

        let message = self.format_message(notification);
        self.send_message(&message).await
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.bot_token.is_empty() && !self.config.chat_id.is_empty()
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

/// HTML 파싱 모드에서 특수 문자를 이스케이프합니다.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
