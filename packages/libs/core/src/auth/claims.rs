//! 토큰 Claims
//!
//! Access Token(PASETO v4.local)의 페이로드 구조입니다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::id::new_token_id;

/// Access Token Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (사용자 email)
    pub sub: String,

    /// 발급 시각
    pub iat: DateTime<Utc>,

    /// 만료 시각
    pub exp: DateTime<Utc>,

    /// Token ID (향후 denylist 키)
    pub jti: String,

    /// Key ID (키 로테이션용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl AccessTokenClaims {
    /// `issued_at`부터 `ttl_seconds` 동안 유효한 claims 생성
    pub fn new(sub: String, issued_at: DateTime<Utc>, ttl_seconds: i64) -> Self {
        Self {
            sub,
            iat: issued_at,
            exp: issued_at + Duration::seconds(ttl_seconds),
            jti: new_token_id(),
            kid: None,
        }
    }

    /// Key ID 설정
    pub fn with_kid(mut self, kid: Option<String>) -> Self {
        self.kid = kid;
        self
    }

    /// 만료 여부 확인 (exp 시각 자체는 아직 유효)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.exp
    }

    /// 남은 TTL (초)
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> i64 {
        (self.exp - now).num_seconds().max(0)
    }
}
