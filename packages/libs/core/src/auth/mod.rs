//! 인증 관련 타입 및 로직
//!
//! # 개요
//!
//! - **Credential Manager** (`CredentialManager`): Argon2id 비밀번호 해시
//! - **Token Service** (`TokenService`): PASETO v4.local Access Token 발급/검증 (stateless)
//! - **Identity Resolver** (`IdentityResolver`): 토큰 → 사용자
//! - **Accounts**: 가입, 로그인, 비밀번호 재설정 요청

mod accounts;
mod claims;
mod key;
mod password;
mod resolver;
mod token;

pub use accounts::{Accounts, IssuedToken, PasswordResetAck, PASSWORD_RESET_MESSAGE};
pub use claims::AccessTokenClaims;
pub use key::TokenKey;
pub use password::{CredentialManager, PasswordConfig};
pub use resolver::IdentityResolver;
pub use token::{bearer_token, TokenConfig, TokenService, DEFAULT_TOKEN_TTL_SECONDS};

#[cfg(test)]
pub(crate) use accounts::test_accounts;
