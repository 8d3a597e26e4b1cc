//! 계정 가입 / 로그인 / 비밀번호 재설정 요청

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::password::CredentialManager;
use super::token::TokenService;
use crate::error::{Error, Result, StoreError};
use crate::model::User;
use crate::store::ResourceStore;

/// 비밀번호 재설정 요청 응답 (계정 존재 여부와 무관하게 동일)
pub const PASSWORD_RESET_MESSAGE: &str =
    "If the email exists, a password reset link has been sent.";

/// 발급된 Access Token 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
}

impl IssuedToken {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// 비밀번호 재설정 요청 확인
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetAck {
    pub message: String,
}

pub struct Accounts {
    credentials: Arc<CredentialManager>,
    tokens: Arc<TokenService>,
    store: Arc<dyn ResourceStore>,
}

impl Accounts {
    pub fn new(
        credentials: Arc<CredentialManager>,
        tokens: Arc<TokenService>,
        store: Arc<dyn ResourceStore>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            store,
        }
    }

    /// 가입 후 토큰 발급
    pub async fn signup(&self, email: &str, password: &str) -> Result<IssuedToken> {
        validate_email(email)?;

        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(Error::EmailAlreadyRegistered);
        }

        let user = User::new(email, self.credentials.hash(password)?);
        match self.store.insert_user(&user).await {
            Ok(()) => {}
            // 동시 가입: 다른 요청이 먼저 저장함
            Err(StoreError::DuplicateKey { .. }) => return Err(Error::EmailAlreadyRegistered),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id = %user.id, "user signed up");

        Ok(IssuedToken::bearer(self.tokens.issue(&user.email)?))
    }

    /// 로그인
    ///
    /// 없는 email과 틀린 비밀번호는 같은 에러를 반환합니다.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !self.credentials.verify(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(Error::InvalidCredentials);
        }

        Ok(IssuedToken::bearer(self.tokens.issue(&user.email)?))
    }

    /// 비밀번호 재설정 요청
    ///
    /// 계정 존재 여부를 노출하지 않도록 항상 같은 응답을 반환합니다.
    pub async fn forgot_password(&self, email: &str) -> Result<PasswordResetAck> {
        if let Some(user) = self.store.find_user_by_email(email).await? {
            // TODO: 메일 발송 연동 (reset 토큰 발급 + 전송)
            tracing::info!(user_id = %user.id, "password reset requested");
        }

        Ok(PasswordResetAck {
            message: PASSWORD_RESET_MESSAGE.to_string(),
        })
    }
}

fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidEmail {
            email: email.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) fn test_accounts(store: Arc<dyn ResourceStore>) -> (Accounts, Arc<TokenService>) {
    let tokens = Arc::new(super::token::test_tokens());
    let credentials = Arc::new(super::password::test_credentials());
    (Accounts::new(credentials, tokens.clone(), store), tokens)
}
