//! 토큰 발급 및 검증 (Token Service)
//!
//! 서버 측 세션 저장소 없이 동작하는 PASETO v4.local 토큰입니다.
//! 만료 시각이 토큰 수명의 유일한 제한이며, 폐기(revocation) 수단은 없습니다.

use chrono::{DateTime, Utc};
use rand::RngCore;
use rusty_paseto::core::{Key, Local, Paseto, PasetoNonce, PasetoSymmetricKey, Payload, V4};

use super::claims::AccessTokenClaims;
use super::key::TokenKey;
use crate::error::{AuthError, Error, Result};

/// 기본 토큰 수명 (30분)
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 30 * 60;

/// 토큰 서비스 설정
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// 키 목록 (`kid:material` 또는 `material`). 첫 번째 키로 발급합니다.
    pub keys: Vec<String>,

    /// 토큰 수명 (초)
    pub ttl_seconds: i64,
}

/// `Authorization` 헤더 값에서 bearer 토큰 추출
pub fn bearer_token(auth_header: Option<&str>) -> Option<&str> {
    auth_header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// 토큰 발급 / 검증기
pub struct TokenService {
    /// 현재 키 + 이전 키들
    keys: Vec<TokenKey>,
    ttl_seconds: i64,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Result<Self> {
        if config.ttl_seconds <= 0 {
            return Err(Error::TokenKey {
                message: format!("token ttl must be positive, got {}", config.ttl_seconds),
            });
        }

        let keys = config
            .keys
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                TokenKey::parse(raw).ok_or_else(|| Error::TokenKey {
                    message: format!("token key #{} is not 32 bytes of key material", idx),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if keys.is_empty() {
            return Err(Error::TokenKey {
                message: "at least one token key is required".to_string(),
            });
        }

        Ok(Self {
            keys,
            ttl_seconds: config.ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// 현재 시각 기준으로 토큰 발급
    pub fn issue(&self, sub: &str) -> Result<String> {
        self.issue_at(sub, Utc::now())
    }

    /// `issued_at` 기준으로 토큰 발급
    pub fn issue_at(&self, sub: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let signing = &self.keys[0];
        let claims = AccessTokenClaims::new(sub.to_string(), issued_at, self.ttl_seconds)
            .with_kid(signing.kid.clone());
        let payload = serde_json::to_string(&claims)?;

        let key = PasetoSymmetricKey::<V4, Local>::from(Key::<32>::from(&signing.bytes));
        let mut nonce_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce_key = Key::<32>::from(&nonce_bytes);
        let nonce = PasetoNonce::<V4, Local>::from(&nonce_key);

        Paseto::<V4, Local>::builder()
            .set_payload(Payload::from(payload.as_str()))
            .try_encrypt(&key, &nonce)
            .map_err(|e| Error::TokenKey {
                message: format!("token encryption failed: {}", e),
            })
    }

    /// 현재 시각 기준으로 토큰 검증
    pub fn verify(&self, token: &str) -> std::result::Result<AccessTokenClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// `now` 기준으로 토큰 검증
    ///
    /// - 어떤 키로도 복호화되지 않거나 claims 구조가 다르면 `AuthError::Invalid`
    /// - `now`가 exp를 지났으면 `AuthError::Expired`
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<AccessTokenClaims, AuthError> {
        let token = token.trim();
        let payload = self.decrypt(token).ok_or_else(|| AuthError::Invalid {
            reason: "paseto validation failed".to_string(),
        })?;

        let claims: AccessTokenClaims =
            serde_json::from_str(&payload).map_err(|e| AuthError::Invalid {
                reason: format!("malformed claims: {}", e),
            })?;

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    fn decrypt(&self, token: &str) -> Option<String> {
        for key in &self.keys {
            let key = PasetoSymmetricKey::<V4, Local>::from(Key::<32>::from(&key.bytes));
            if let Ok(payload) = Paseto::<V4, Local>::try_decrypt(token, &key, None, None) {
                return Some(payload);
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) fn test_tokens() -> TokenService {
    TokenService::new(&TokenConfig {
        keys: vec!["k1:wubbalubbadubdubwubbalubbadubdub".to_string()],
        ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_issue_and_verify() {
        let tokens = test_tokens();
        let token = tokens.issue("alice@example.com").unwrap();

        assert!(token.starts_with("v4.local."));
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.kid.as_deref(), Some("k1"));
    }

    #[test]
    fn test_expiry_boundary() {
        let tokens = test_tokens();
        let issued_at = Utc::now();
        let lifetime = Duration::seconds(tokens.ttl_seconds());
        let epsilon = Duration::seconds(1);
        let token = tokens.issue_at("alice@example.com", issued_at).unwrap();

        assert!(tokens.verify_at(&token, issued_at + lifetime - epsilon).is_ok());
        assert_eq!(
            tokens.verify_at(&token, issued_at + lifetime + epsilon),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let tokens = test_tokens();
        let token = tokens.issue("alice@example.com").unwrap();

        let mut tampered = token.clone().into_bytes();
        let idx = "v4.local.".len() + 20;
        tampered[idx] = if tampered[idx] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(matches!(
            tokens.verify(&tampered),
            Err(AuthError::Invalid { .. })
        ));
        assert!(matches!(
            tokens.verify("not-a-token"),
            Err(AuthError::Invalid { .. })
        ));
    }

    #[test]
    fn test_foreign_key_is_invalid() {
        let tokens = test_tokens();
        let other = TokenService::new(&TokenConfig {
            keys: vec!["ab".repeat(32)],
            ttl_seconds: 60,
        })
        .unwrap();

        let token = other.issue("alice@example.com").unwrap();
        assert!(matches!(
            tokens.verify(&token),
            Err(AuthError::Invalid { .. })
        ));
    }

    #[test]
    fn test_key_rotation() {
        let old = test_tokens();
        let token = old.issue("alice@example.com").unwrap();

        let rotated = TokenService::new(&TokenConfig {
            keys: vec![
                format!("k2:{}", "cd".repeat(32)),
                "k1:wubbalubbadubdubwubbalubbadubdub".to_string(),
            ],
            ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        })
        .unwrap();

        // 이전 키로 발급된 토큰도 검증
        assert_eq!(rotated.verify(&token).unwrap().kid.as_deref(), Some("k1"));

        let fresh = rotated.issue("alice@example.com").unwrap();
        assert_eq!(rotated.verify(&fresh).unwrap().kid.as_deref(), Some("k2"));
        assert!(old.verify(&fresh).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let no_keys = TokenService::new(&TokenConfig {
            keys: vec![],
            ttl_seconds: 60,
        });
        assert!(no_keys.is_err());

        let bad_key = TokenService::new(&TokenConfig {
            keys: vec!["short".to_string()],
            ttl_seconds: 60,
        });
        assert!(bad_key.is_err());

        let bad_ttl = TokenService::new(&TokenConfig {
            keys: vec!["ab".repeat(32)],
            ttl_seconds: 0,
        });
        assert!(bad_ttl.is_err());
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer mytoken")), Some("mytoken"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
