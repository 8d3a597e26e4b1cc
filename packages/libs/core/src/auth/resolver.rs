//! 호출자 확인 (Identity Resolver)
//!
//! 요청마다 토큰을 검증하고 저장소에서 사용자를 조회합니다. 결과는 캐시하지 않습니다.

use std::sync::Arc;

use super::token::TokenService;
use crate::error::{AuthError, Result};
use crate::model::User;
use crate::store::ResourceStore;

pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    store: Arc<dyn ResourceStore>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn ResourceStore>) -> Self {
        Self { tokens, store }
    }

    /// bearer 토큰으로 현재 사용자 확인
    ///
    /// - 토큰 없음 / 만료 / 위조 → `AuthError::Unauthenticated`
    /// - 유효한 토큰이지만 사용자가 없음 → `AuthError::UnknownPrincipal`
    pub async fn resolve(&self, token: Option<&str>) -> Result<User> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Unauthenticated {
                reason: "missing bearer token".to_string(),
            })?;

        let claims = self
            .tokens
            .verify(token)
            .map_err(|e| AuthError::Unauthenticated {
                reason: e.to_string(),
            })?;

        match self.store.find_user_by_email(&claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                tracing::debug!(sub = %claims.sub, "token subject has no account");
                Err(AuthError::UnknownPrincipal { sub: claims.sub }.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::test_tokens;
    use crate::error::Error;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    fn resolver(store: Arc<MemoryStore>) -> (IdentityResolver, Arc<TokenService>) {
        let tokens = Arc::new(test_tokens());
        (IdentityResolver::new(tokens.clone(), store), tokens)
    }

    #[tokio::test]
    async fn test_resolve_known_user() {
        let store = Arc::new(MemoryStore::new());
        let alice = User::new("alice@example.com", "hash");
        store.insert_user(&alice).await.unwrap();
        let (resolver, tokens) = resolver(store);

        let token = tokens.issue("alice@example.com").unwrap();
        let user = resolver.resolve(Some(token.as_str())).await.unwrap();
        assert_eq!(user.id, alice.id);
    }

    #[tokio::test]
    async fn test_missing_or_bad_token() {
        let (resolver, tokens) = resolver(Arc::new(MemoryStore::new()));

        let err = resolver.resolve(None).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Unauthenticated { .. })));

        let err = resolver.resolve(Some("   ")).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Unauthenticated { .. })));

        let err = resolver.resolve(Some("v4.local.garbage")).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Unauthenticated { .. })));

        let expired = tokens
            .issue_at("alice@example.com", Utc::now() - Duration::hours(2))
            .unwrap();
        match resolver.resolve(Some(expired.as_str())).await.unwrap_err() {
            Error::Auth(AuthError::Unauthenticated { reason }) => {
                assert_eq!(reason, "token expired")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_principal() {
        let (resolver, tokens) = resolver(Arc::new(MemoryStore::new()));
        let token = tokens.issue("ghost@example.com").unwrap();

        let err = resolver.resolve(Some(token.as_str())).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(AuthError::UnknownPrincipal { ref sub }) if sub == "ghost@example.com"
        ));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(MemoryStore::new());
        let (resolver, tokens) = resolver(store.clone());
        let token = tokens.issue("alice@example.com").unwrap();

        store.set_offline(true);
        let err = resolver.resolve(Some(token.as_str())).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
    }
}
