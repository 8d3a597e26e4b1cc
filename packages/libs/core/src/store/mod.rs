//! Resource Store 인터페이스
//!
//! User / Slate / ShareGrant 영속화를 담당하는 저장소 추상화입니다.
//! 모든 연산은 단일 레코드 수준에서 원자적이어야 하며,
//! `delete_slate_cascade`는 Slate와 그 ShareGrant 전체를 하나의 단위로 삭제해야 합니다.
//!
//! # 구현체
//!
//! - `MemoryStore`: 프로세스 내 저장소 (테스트/개발용)
//! - `slate-api`의 `SqliteStore`: sqlx 기반 SQLite 저장소

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{Permission, ShareGrant, Slate, SlatePatch, User};

pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait ResourceStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────────
    // users
    // ─────────────────────────────────────────────────────────────────────────────

    /// 사용자 저장. email이 이미 있으면 `StoreError::DuplicateKey`
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>>;

    // ─────────────────────────────────────────────────────────────────────────────
    // slates
    // ─────────────────────────────────────────────────────────────────────────────

    async fn insert_slate(&self, slate: &Slate) -> StoreResult<()>;

    async fn find_slate(&self, slate_id: &str) -> StoreResult<Option<Slate>>;

    /// 소유자의 Slate 목록 (생성 시각순)
    async fn find_slates_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Slate>>;

    /// ID 목록으로 일괄 조회. 존재하지 않는 ID는 건너뜁니다.
    async fn find_slates_by_ids(&self, slate_ids: &[String]) -> StoreResult<Vec<Slate>>;

    /// 패치 적용 후 갱신된 Slate 반환. Slate가 없으면 `None`
    async fn update_slate(
        &self,
        slate_id: &str,
        patch: &SlatePatch,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Slate>>;

    /// Slate와 이를 참조하는 모든 ShareGrant를 원자적으로 삭제.
    /// Slate가 존재했는지 반환합니다.
    async fn delete_slate_cascade(&self, slate_id: &str) -> StoreResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────────
    // shared_slates
    // ─────────────────────────────────────────────────────────────────────────────

    async fn find_grant(&self, slate_id: &str, user_id: &str) -> StoreResult<Option<ShareGrant>>;

    async fn find_grants_for_user(&self, user_id: &str) -> StoreResult<Vec<ShareGrant>>;

    /// grant 저장. (slate_id, user_id) 쌍이 이미 있으면 `StoreError::DuplicateKey`
    async fn insert_grant(&self, grant: &ShareGrant) -> StoreResult<()>;

    /// (slate_id, user_id) 쌍의 grant 권한과 시각 갱신. grant가 없으면 `None`
    async fn update_grant(
        &self,
        slate_id: &str,
        user_id: &str,
        permission: Permission,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ShareGrant>>;
}
