//! 외부 시세 API 자격증명.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// 시세 제공자 API 자격증명.
///
/// 프로세스 범위에서 공유되며, 로그나 `Debug` 출력에 키가 노출되지 않습니다.
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: SecretString,
}

impl ApiCredentials {
    /// 새 자격증명을 생성합니다.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// HTTP 헤더에 실을 API 키를 반환합니다.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let credentials = ApiCredentials::new("super-secret");
        assert_eq!(credentials.api_key(), "super-secret");
        assert!(!format!("{:?}", credentials).contains("super-secret"));
    }
}
