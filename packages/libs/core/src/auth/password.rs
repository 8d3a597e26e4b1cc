//! 비밀번호 해시 (Credential Manager)
//!
//! Argon2id PHC 문자열을 사용합니다. salt가 해시 문자열에 포함되므로
//! 같은 비밀번호도 매번 다른 결과가 나오고, 검증은 저장된 파라미터를 그대로 사용합니다.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{Error, Result};

/// 해시 작업량 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    /// 반복 횟수
    pub t_cost: u32,

    /// 메모리 (KiB)
    pub m_cost_kib: u32,

    /// 병렬도
    pub p_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            t_cost: Params::DEFAULT_T_COST,
            m_cost_kib: Params::DEFAULT_M_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

/// 비밀번호 해시 / 검증기
#[derive(Clone)]
pub struct CredentialManager {
    argon2: Argon2<'static>,
}

impl CredentialManager {
    pub fn new(config: PasswordConfig) -> Result<Self> {
        let params = Params::new(config.m_cost_kib, config.t_cost, config.p_cost, None).map_err(
            |e| Error::PasswordHash {
                message: format!("invalid argon2 parameters: {}", e),
            },
        )?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 비밀번호 해시 (매 호출마다 새 salt)
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::PasswordHash {
                message: e.to_string(),
            })
    }

    /// 비밀번호 검증
    ///
    /// 저장된 해시가 PHC 형식이 아니면 `false`를 반환합니다.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_credentials() -> CredentialManager {
    CredentialManager::new(PasswordConfig {
        t_cost: 1,
        m_cost_kib: 8,
        p_cost: 1,
    })
    .unwrap()
}
