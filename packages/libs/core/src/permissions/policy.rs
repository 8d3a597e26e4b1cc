//! Slate 접근 정책
//!
//! 소유권과 ShareGrant만으로 결정되는 순수 함수입니다. 저장소 조회는
//! `AccessControl`이 담당하고, 판단은 모두 여기서 합니다.

use crate::model::{Permission, ShareGrant, Slate, User};

/// Slate에 대한 능력
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// 조회
    Read,

    /// 이름 / 미리보기 색상 수정
    Write,

    /// 삭제, 공유 (소유자 전용, 위임 불가)
    Administer,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Administer => "administer",
        }
    }
}

/// 정책 평가 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// 허용 여부
    pub allowed: bool,

    /// 거부 사유 (allowed=false인 경우)
    pub reason: Option<String>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// 능력 평가
///
/// `grant`는 (slate, principal) 쌍의 grant여야 하며, 다른 쌍의 grant는 무시합니다.
/// 소유자에게는 grant가 존재하더라도 참조하지 않습니다.
pub fn evaluate(
    capability: Capability,
    principal: &User,
    slate: &Slate,
    grant: Option<&ShareGrant>,
) -> Decision {
    if slate.is_owned_by(&principal.id) {
        return Decision::allow();
    }

    if capability == Capability::Administer {
        return Decision::deny("only the owner can administer a slate");
    }

    let Some(grant) = grant.filter(|g| g.applies_to(&slate.id, &principal.id)) else {
        return Decision::deny("slate is not shared with this user");
    };

    match (capability, grant.permission) {
        (Capability::Read, _) => Decision::allow(),
        (Capability::Write, Permission::Write) => Decision::allow(),
        (Capability::Write, Permission::Read) => Decision::deny("slate is shared read-only"),
        (Capability::Administer, _) => Decision::deny("only the owner can administer a slate"),
    }
}

pub fn can_read(principal: &User, slate: &Slate, grant: Option<&ShareGrant>) -> bool {
    evaluate(Capability::Read, principal, slate, grant).allowed
}

pub fn can_write(principal: &User, slate: &Slate, grant: Option<&ShareGrant>) -> bool {
    evaluate(Capability::Write, principal, slate, grant).allowed
}

pub fn can_administer(principal: &User, slate: &Slate) -> bool {
    evaluate(Capability::Administer, principal, slate, None).allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (User, User, Slate) {
        let owner = User::new("alice@example.com", "h");
        let other = User::new("bob@example.com", "h");
        let slate = Slate::new(&owner.id, "Board A", None);
        (owner, other, slate)
    }

    #[test]
    fn test_owner_has_everything() {
        let (owner, _, slate) = fixture();
        assert!(can_read(&owner, &slate, None));
        assert!(can_write(&owner, &slate, None));
        assert!(can_administer(&owner, &slate));
    }

    #[test]
    fn test_stranger_has_nothing() {
        let (_, other, slate) = fixture();
        assert!(!can_read(&other, &slate, None));
        assert!(!can_write(&other, &slate, None));
        assert!(!can_administer(&other, &slate));
    }

    #[test]
    fn test_read_grant() {
        let (_, other, slate) = fixture();
        let grant = ShareGrant::new(&slate.id, &other.id, Permission::Read);

        assert!(can_read(&other, &slate, Some(&grant)));
        assert!(!can_write(&other, &slate, Some(&grant)));

        let decision = evaluate(Capability::Write, &other, &slate, Some(&grant));
        assert_eq!(decision.reason.as_deref(), Some("slate is shared read-only"));
    }

    #[test]
    fn test_write_grant_implies_read() {
        let (_, other, slate) = fixture();
        let grant = ShareGrant::new(&slate.id, &other.id, Permission::Write);

        assert!(can_read(&other, &slate, Some(&grant)));
        assert!(can_write(&other, &slate, Some(&grant)));
        // 쓰기 권한이 있어도 관리 권한은 없음
        assert!(!evaluate(Capability::Administer, &other, &slate, Some(&grant)).allowed);
    }

    #[test]
    fn test_grant_for_other_pair_is_ignored() {
        let (_, other, slate) = fixture();
        let foreign_slate = ShareGrant::new("another-slate", &other.id, Permission::Write);
        let foreign_user = ShareGrant::new(&slate.id, "someone-else", Permission::Write);

        assert!(!can_read(&other, &slate, Some(&foreign_slate)));
        assert!(!can_read(&other, &slate, Some(&foreign_user)));
    }
}
