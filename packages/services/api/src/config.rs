//! API 서버 설정

use std::env;

use slate_core::auth::{PasswordConfig, TokenConfig, DEFAULT_TOKEN_TTL_SECONDS};

/// API 서버 설정
#[derive(Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// SQLite URL
    pub db_url: String,

    /// DB Connection Pool 크기
    pub db_max_connections: u32,

    /// PASETO keys (kid:material or material). 첫 번째 키로 발급
    pub token_keys: Vec<String>,

    /// Access Token 수명 (초)
    pub token_ttl_secs: i64,

    /// Argon2 반복 횟수
    pub argon2_t_cost: u32,

    /// Argon2 메모리 (KiB)
    pub argon2_m_cost_kib: u32,

    /// Argon2 병렬도
    pub argon2_p_cost: u32,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 임의의 조회 함수에서 설정 로드
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = PasswordConfig::default();

        let token_keys = lookup("SLATE_TOKEN_KEYS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if token_keys.is_empty() {
            anyhow::bail!("SLATE_TOKEN_KEYS must contain at least one key");
        }

        Ok(Self {
            port: lookup("SLATE_API_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()?,

            db_url: lookup("SLATE_DB_URL").unwrap_or_else(|| "sqlite://slatecanvas.db".to_string()),

            db_max_connections: lookup("SLATE_DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            token_keys,

            token_ttl_secs: lookup("SLATE_TOKEN_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),

            argon2_t_cost: lookup("SLATE_ARGON2_T_COST")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.t_cost),

            argon2_m_cost_kib: lookup("SLATE_ARGON2_M_COST_KIB")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.m_cost_kib),

            argon2_p_cost: lookup("SLATE_ARGON2_P_COST")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.p_cost),
        })
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            keys: self.token_keys.clone(),
            ttl_seconds: self.token_ttl_secs,
        }
    }

    pub fn password_config(&self) -> PasswordConfig {
        PasswordConfig {
            t_cost: self.argon2_t_cost,
            m_cost_kib: self.argon2_m_cost_kib,
            p_cost: self.argon2_p_cost,
        }
    }
}

// 키 재료는 로그에 남기지 않음
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("db_url", &self.db_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("token_keys", &format!("<{} keys>", self.token_keys.len()))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("argon2_t_cost", &self.argon2_t_cost)
            .field("argon2_m_cost_kib", &self.argon2_m_cost_kib)
            .field("argon2_p_cost", &self.argon2_p_cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("SLATE_TOKEN_KEYS", "k1:secret")])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.db_url, "sqlite://slatecanvas.db");
        assert_eq!(config.token_ttl_secs, 1800);
        assert_eq!(config.token_keys, vec!["k1:secret".to_string()]);
        assert_eq!(config.password_config(), PasswordConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SLATE_TOKEN_KEYS", "k2:new, k1:old ,"),
            ("SLATE_API_PORT", "8080"),
            ("SLATE_TOKEN_TTL_SECS", "600"),
            ("SLATE_ARGON2_T_COST", "3"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.token_keys, vec!["k2:new".to_string(), "k1:old".to_string()]);
        assert_eq!(config.token_config().ttl_seconds, 600);
        assert_eq!(config.password_config().t_cost, 3);
    }

    #[test]
    fn test_keys_required() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("SLATE_TOKEN_KEYS", " , ")])).is_err());
    }

    #[test]
    fn test_debug_hides_keys() {
        let config = Config::from_lookup(lookup(&[("SLATE_TOKEN_KEYS", "k1:topsecret")])).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("topsecret"));
    }
}
