//! 프로세스 내 저장소
//!
//! 모든 컬렉션을 하나의 `RwLock` 아래 두어, 각 연산(cascade 삭제 포함)이
//! 다른 연산과 섞이지 않도록 합니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ResourceStore, StoreResult};
use crate::error::StoreError;
use crate::model::{Permission, ShareGrant, Slate, SlatePatch, User};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<String, User>,

    /// email → user id (unique)
    users_by_email: HashMap<String, String>,

    slates: HashMap<String, Slate>,

    /// (slate_id, user_id) → grant (unique)
    grants: HashMap<(String, String), ShareGrant>,
}

/// 메모리 저장소
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장소 장애 흉내. `true`이면 모든 연산이 `StoreError::Unavailable`로 실패합니다.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// 저장된 grant 개수 (진단용)
    pub async fn grant_count(&self) -> usize {
        self.inner.read().await.grants.len()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "memory store is offline".to_string(),
            });
        }
        Ok(())
    }
}

fn sorted_by_creation(mut slates: Vec<Slate>) -> Vec<Slate> {
    slates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    slates
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        if inner.users_by_email.contains_key(&user.email) {
            return Err(StoreError::DuplicateKey {
                key: "users.email".to_string(),
            });
        }
        inner
            .users_by_email
            .insert(user.email.clone(), user.id.clone());
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_online()?;
        let inner = self.inner.read().await;
        Ok(inner
            .users_by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.check_online()?;
        Ok(self.inner.read().await.users.get(user_id).cloned())
    }

    async fn insert_slate(&self, slate: &Slate) -> StoreResult<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        if inner.slates.contains_key(&slate.id) {
            return Err(StoreError::DuplicateKey {
                key: "slates.id".to_string(),
            });
        }
        inner.slates.insert(slate.id.clone(), slate.clone());
        Ok(())
    }

    async fn find_slate(&self, slate_id: &str) -> StoreResult<Option<Slate>> {
        self.check_online()?;
        Ok(self.inner.read().await.slates.get(slate_id).cloned())
    }

    async fn find_slates_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Slate>> {
        self.check_online()?;
        let inner = self.inner.read().await;
        let owned = inner
            .slates
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(owned))
    }

    async fn find_slates_by_ids(&self, slate_ids: &[String]) -> StoreResult<Vec<Slate>> {
        self.check_online()?;
        let inner = self.inner.read().await;
        let found = slate_ids
            .iter()
            .filter_map(|id| inner.slates.get(id))
            .cloned()
            .collect();
        Ok(sorted_by_creation(found))
    }

    async fn update_slate(
        &self,
        slate_id: &str,
        patch: &SlatePatch,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Slate>> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        Ok(inner.slates.get_mut(slate_id).map(|slate| {
            patch.apply(slate, at);
            slate.clone()
        }))
    }

    async fn delete_slate_cascade(&self, slate_id: &str) -> StoreResult<bool> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        inner.grants.retain(|(sid, _), _| sid != slate_id);
        Ok(inner.slates.remove(slate_id).is_some())
    }

    async fn find_grant(&self, slate_id: &str, user_id: &str) -> StoreResult<Option<ShareGrant>> {
        self.check_online()?;
        let key = (slate_id.to_string(), user_id.to_string());
        Ok(self.inner.read().await.grants.get(&key).cloned())
    }

    async fn find_grants_for_user(&self, user_id: &str) -> StoreResult<Vec<ShareGrant>> {
        self.check_online()?;
        let inner = self.inner.read().await;
        let mut grants: Vec<ShareGrant> = inner
            .grants
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        grants.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(grants)
    }

    async fn insert_grant(&self, grant: &ShareGrant) -> StoreResult<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        let key = (grant.slate_id.clone(), grant.user_id.clone());
        if inner.grants.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                key: "shared_slates(slate_id, user_id)".to_string(),
            });
        }
        inner.grants.insert(key, grant.clone());
        Ok(())
    }

    async fn update_grant(
        &self,
        slate_id: &str,
        user_id: &str,
        permission: Permission,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ShareGrant>> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        let key = (slate_id.to_string(), user_id.to_string());
        Ok(inner.grants.get_mut(&key).map(|grant| {
            grant.permission = permission;
            grant.joined_at = at;
            grant.clone()
        }))
    }
}
