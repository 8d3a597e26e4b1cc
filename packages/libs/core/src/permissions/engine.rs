//! 접근 제어 엔진
//!
//! 모든 특권 연산은 Slate를 불러온 뒤 `policy`의 판단을 거쳐 수행됩니다.
//! 엔진 자체는 상태가 없으며, 동시 요청 간의 일관성은 저장소의 unique 키와
//! 원자적 cascade 삭제에 의존합니다.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::policy::{evaluate, Capability, Decision};
use crate::error::{AccessError, Result, StoreError};
use crate::model::{Permission, ShareGrant, Slate, SlatePatch, User};
use crate::store::ResourceStore;

/// `share`가 update/insert 경합을 재시도하는 최대 횟수
pub const MAX_SHARE_ATTEMPTS: u32 = 3;

/// 사용자가 접근 가능한 Slate 목록
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibleSlates {
    /// 직접 소유한 Slate
    pub owned: Vec<Slate>,

    /// 공유받은 Slate (owned와 겹치지 않음)
    pub shared: Vec<Slate>,
}

pub struct AccessControl {
    store: Arc<dyn ResourceStore>,
}

impl AccessControl {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Decisions
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn can_read(&self, principal: &User, slate: &Slate) -> Result<bool> {
        Ok(self.decide(Capability::Read, principal, slate).await?.allowed)
    }

    pub async fn can_write(&self, principal: &User, slate: &Slate) -> Result<bool> {
        Ok(self.decide(Capability::Write, principal, slate).await?.allowed)
    }

    pub async fn can_administer(&self, principal: &User, slate: &Slate) -> Result<bool> {
        Ok(self
            .decide(Capability::Administer, principal, slate)
            .await?
            .allowed)
    }

    /// 능력이 없으면 `AccessError::PermissionDenied`
    pub async fn require(
        &self,
        capability: Capability,
        principal: &User,
        slate: &Slate,
    ) -> Result<()> {
        let decision = self.decide(capability, principal, slate).await?;
        if decision.allowed {
            return Ok(());
        }

        tracing::debug!(
            user_id = %principal.id,
            slate_id = %slate.id,
            capability = capability.as_str(),
            "access denied"
        );
        Err(AccessError::PermissionDenied {
            reason: decision
                .reason
                .unwrap_or_else(|| format!("{} access denied", capability.as_str())),
        }
        .into())
    }

    async fn decide(
        &self,
        capability: Capability,
        principal: &User,
        slate: &Slate,
    ) -> Result<Decision> {
        // 소유자이거나 관리 권한 확인이면 grant 조회가 필요 없음
        let grant = if slate.is_owned_by(&principal.id) || capability == Capability::Administer {
            None
        } else {
            self.store.find_grant(&slate.id, &principal.id).await?
        };
        Ok(evaluate(capability, principal, slate, grant.as_ref()))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Slate operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// ID로 Slate 조회 (권한 확인 없음)
    pub async fn load_slate(&self, slate_id: &str) -> Result<Slate> {
        self.store
            .find_slate(slate_id)
            .await?
            .ok_or_else(|| {
                AccessError::NotFound {
                    slate_id: slate_id.to_string(),
                }
                .into()
            })
    }

    /// 새 Slate 생성 (호출자가 소유자)
    pub async fn create_slate(
        &self,
        principal: &User,
        name: &str,
        preview_color: Option<String>,
    ) -> Result<Slate> {
        let slate = Slate::new(&principal.id, name, preview_color);
        self.store.insert_slate(&slate).await?;
        tracing::info!(user_id = %principal.id, slate_id = %slate.id, "slate created");
        Ok(slate)
    }

    /// 읽기 권한 확인 후 Slate 반환
    pub async fn get_slate(&self, principal: &User, slate_id: &str) -> Result<Slate> {
        let slate = self.load_slate(slate_id).await?;
        self.require(Capability::Read, principal, &slate).await?;
        Ok(slate)
    }

    /// 쓰기 권한 확인 후 메타데이터 수정
    pub async fn update_slate(
        &self,
        principal: &User,
        slate_id: &str,
        patch: &SlatePatch,
    ) -> Result<Slate> {
        let slate = self.load_slate(slate_id).await?;
        self.require(Capability::Write, principal, &slate).await?;

        // 확인과 수정 사이에 삭제되었을 수 있음
        self.store
            .update_slate(&slate.id, patch, Utc::now())
            .await?
            .ok_or_else(|| {
                AccessError::NotFound {
                    slate_id: slate.id.clone(),
                }
                .into()
            })
    }

    /// Slate 삭제 (소유자 전용). 모든 ShareGrant가 함께 삭제됩니다.
    pub async fn delete_slate(&self, principal: &User, slate: &Slate) -> Result<()> {
        self.require(Capability::Administer, principal, slate).await?;

        if !self.store.delete_slate_cascade(&slate.id).await? {
            return Err(AccessError::NotFound {
                slate_id: slate.id.clone(),
            }
            .into());
        }
        tracing::info!(user_id = %principal.id, slate_id = %slate.id, "slate deleted");
        Ok(())
    }

    /// Slate 공유
    ///
    /// 순서: 관리 권한 → 대상 사용자 → 권한 값. 같은 (slate, user) 쌍이 이미 있으면
    /// 권한과 시각만 갱신하므로, 호출 후에는 항상 정확히 하나의 grant가 남습니다.
    pub async fn share(
        &self,
        owner: &User,
        slate: &Slate,
        target_email: &str,
        permission: &str,
    ) -> Result<ShareGrant> {
        self.require(Capability::Administer, owner, slate).await?;

        let target = self
            .store
            .find_user_by_email(target_email)
            .await?
            .ok_or_else(|| AccessError::TargetNotFound {
                email: target_email.to_string(),
            })?;

        let permission: Permission = permission.parse()?;

        if slate.is_owned_by(&target.id) {
            return Err(AccessError::OwnerGrant.into());
        }

        let grant = self.upsert_grant(&slate.id, &target.id, permission).await?;
        tracing::info!(
            slate_id = %slate.id,
            target_user_id = %target.id,
            permission = %permission,
            "slate shared"
        );
        Ok(grant)
    }

    /// update 먼저, 없으면 insert.
    /// insert가 unique 키에 걸리면 다른 요청이 먼저 넣은 것이므로 update로 다시 시도합니다.
    async fn upsert_grant(
        &self,
        slate_id: &str,
        user_id: &str,
        permission: Permission,
    ) -> Result<ShareGrant> {
        for attempt in 1..=MAX_SHARE_ATTEMPTS {
            if let Some(grant) = self
                .store
                .update_grant(slate_id, user_id, permission, Utc::now())
                .await?
            {
                return Ok(grant);
            }

            let grant = ShareGrant::new(slate_id, user_id, permission);
            match self.store.insert_grant(&grant).await {
                Ok(()) => return Ok(grant),
                Err(StoreError::DuplicateKey { .. }) => {
                    tracing::debug!(slate_id, user_id, attempt, "concurrent share, retrying as update");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(slate_id, user_id, "share grant upsert did not settle");
        Err(AccessError::Conflict {
            slate_id: slate_id.to_string(),
            attempts: MAX_SHARE_ATTEMPTS,
        }
        .into())
    }

    /// 소유 Slate와 공유받은 Slate 목록
    ///
    /// 공유 목록은 grant의 slate_id를 모은 뒤 일괄 조회합니다. 삭제된 Slate를
    /// 가리키는 grant는 결과에 나타나지 않으며, 같은 Slate가 두 목록에 동시에
    /// 나오지 않습니다.
    pub async fn list_accessible(&self, principal: &User) -> Result<AccessibleSlates> {
        let owned = self.store.find_slates_by_owner(&principal.id).await?;
        let grants = self.store.find_grants_for_user(&principal.id).await?;

        let owned_ids: HashSet<&str> = owned.iter().map(|s| s.id.as_str()).collect();
        let mut seen = HashSet::new();
        let shared_ids: Vec<String> = grants
            .into_iter()
            .map(|g| g.slate_id)
            .filter(|id| !owned_ids.contains(id.as_str()) && seen.insert(id.clone()))
            .collect();

        let shared = if shared_ids.is_empty() {
            Vec::new()
        } else {
            self.store
                .find_slates_by_ids(&shared_ids)
                .await?
                .into_iter()
                .filter(|s| !s.is_owned_by(&principal.id))
                .collect()
        };

        Ok(AccessibleSlates { owned, shared })
    }
}
