//! 도메인 레코드
//!
//! 저장소 경계에서 검증된 필드 집합으로 변환된 User / Slate / ShareGrant 입니다.
//! 비즈니스 로직은 저장소 문서를 직접 다루지 않고 이 타입들만 사용합니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::id::new_record_id;

/// 새 Slate의 기본 미리보기 색상
pub const DEFAULT_PREVIEW_COLOR: &str = "#3b82f6";

/// 사용자
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    /// 저장된 그대로 비교 (대소문자 구분)
    pub email: String,

    /// PHC 문자열 (Argon2id, salt 포함)
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// 새 사용자 생성
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Slate (문서 / 작업 공간)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slate {
    pub id: String,
    pub name: String,
    pub preview_color: String,
    pub owner_id: String,
    pub last_modified: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Slate {
    /// 새 Slate 생성
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, preview_color: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_record_id(),
            name: name.into(),
            preview_color: preview_color.unwrap_or_else(|| DEFAULT_PREVIEW_COLOR.to_string()),
            owner_id: owner_id.into(),
            last_modified: now,
            created_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Slate 메타데이터 부분 수정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlatePatch {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub preview_color: Option<String>,
}

impl SlatePatch {
    /// 패치를 적용하고 last_modified 갱신
    pub fn apply(&self, slate: &mut Slate, at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            slate.name = name.clone();
        }
        if let Some(color) = &self.preview_color {
            slate.preview_color = color.clone();
        }
        slate.last_modified = at;
    }
}

/// 공유 권한 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }
}

impl FromStr for Permission {
    type Err = AccessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            other => Err(AccessError::InvalidPermission {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 공유 권한 부여 (slate_id, user_id 쌍마다 최대 1개)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareGrant {
    pub id: String,
    pub slate_id: String,
    pub user_id: String,
    pub permission: Permission,

    /// 부여 또는 마지막 갱신 시각
    pub joined_at: DateTime<Utc>,
}

impl ShareGrant {
    pub fn new(slate_id: impl Into<String>, user_id: impl Into<String>, permission: Permission) -> Self {
        Self {
            id: new_record_id(),
            slate_id: slate_id.into(),
            user_id: user_id.into(),
            permission,
            joined_at: Utc::now(),
        }
    }

    /// 이 grant가 (slate, user) 쌍에 대한 것인지 확인
    pub fn applies_to(&self, slate_id: &str, user_id: &str) -> bool {
        self.slate_id == slate_id && self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_parsing() {
        assert_eq!("read".parse::<Permission>(), Ok(Permission::Read));
        assert_eq!("write".parse::<Permission>(), Ok(Permission::Write));
        assert_eq!(
            "admin".parse::<Permission>(),
            Err(AccessError::InvalidPermission {
                value: "admin".to_string()
            })
        );
        // 대소문자 구분
        assert!("Write".parse::<Permission>().is_err());
    }

    #[test]
    fn test_slate_defaults() {
        let slate = Slate::new("user_1", "Board A", None);
        assert_eq!(slate.preview_color, DEFAULT_PREVIEW_COLOR);
        assert_eq!(slate.last_modified, slate.created_at);
        assert!(slate.is_owned_by("user_1"));
        assert!(!slate.is_owned_by("user_2"));
    }

    #[test]
    fn test_slate_patch_apply() {
        let mut slate = Slate::new("user_1", "Board A", Some("#000000".to_string()));
        let later = slate.created_at + chrono::Duration::seconds(5);

        let patch = SlatePatch {
            name: Some("Board B".to_string()),
            preview_color: None,
        };
        patch.apply(&mut slate, later);

        assert_eq!(slate.name, "Board B");
        assert_eq!(slate.preview_color, "#000000");
        assert_eq!(slate.last_modified, later);
    }

    #[test]
    fn test_user_serialization_hides_hash() {
        let user = User::new("alice@example.com", "$argon2id$v=19$...");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "alice@example.com");
    }
}
