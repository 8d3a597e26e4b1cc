//! ID 생성
//!
//! - 레코드 ID (User, Slate, ShareGrant): UUID v4
//! - 토큰 ID (`jti`): ULID (발급 시각순 정렬 가능, 향후 denylist 키)

/// 레코드 ID 생성 (UUID v4, 하이픈 포함 36자)
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 토큰 ID 생성 (ULID, 26자)
pub fn new_token_id() -> String {
    ulid::Ulid::new().to_string()
}
