//! API 앱 상태

use std::sync::Arc;

use slate_core::auth::{Accounts, CredentialManager, IdentityResolver, TokenService};
use slate_core::permissions::AccessControl;
use slate_core::store::ResourceStore;

use crate::config::Config;
use crate::db::SqliteStore;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다. 구성 요소는 모두 같은 저장소를 바라봅니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// 가입 / 로그인
    pub accounts: Accounts,

    /// bearer 토큰 → 사용자
    pub resolver: IdentityResolver,

    /// Slate 권한 판단 및 변경
    pub access: AccessControl,
}

impl AppState {
    /// 설정의 SQLite에 연결하여 상태 생성
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store = SqliteStore::connect(&config.db_url, config.db_max_connections).await?;
        tracing::info!(db_url = %config.db_url, "database ready");
        Self::with_store(config, Arc::new(store))
    }

    /// 주어진 저장소로 상태 생성
    pub fn with_store(config: &Config, store: Arc<dyn ResourceStore>) -> anyhow::Result<Self> {
        let credentials = Arc::new(CredentialManager::new(config.password_config())?);
        let tokens = Arc::new(TokenService::new(&config.token_config())?);

        Ok(Self {
            config: config.clone(),
            accounts: Accounts::new(credentials, tokens.clone(), store.clone()),
            resolver: IdentityResolver::new(tokens, store.clone()),
            access: AccessControl::new(store),
        })
    }
}
