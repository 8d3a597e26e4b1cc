//! 공통 에러 타입
//!
//! 인증(`AuthError`), 접근 제어(`AccessError`), 저장소(`StoreError`) 에러와
//! 이를 감싸는 crate 공통 `Error`를 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// 토큰 검증 / 호출자 확인 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication required: {reason}")]
    Unauthenticated { reason: String },

    #[error("token expired")]
    Expired,

    #[error("invalid token: {reason}")]
    Invalid { reason: String },

    #[error("unknown principal: {sub}")]
    UnknownPrincipal { sub: String },
}

/// Slate 접근 제어 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("slate not found: {slate_id}")]
    NotFound { slate_id: String },

    #[error("target user not found: {email}")]
    TargetNotFound { email: String },

    #[error("invalid permission: {value}")]
    InvalidPermission { value: String },

    #[error("share grant for slate '{slate_id}' kept changing, giving up after {attempts} attempts")]
    Conflict { slate_id: String, attempts: u32 },

    #[error("cannot share a slate with its owner")]
    OwnerGrant,
}

/// 저장소 에러
///
/// 저장소 구현체는 드라이버 에러를 이 두 가지로만 변환합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// unique 키 충돌 (users.email, shared_slates(slate_id, user_id))
    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },

    /// 타임아웃, 연결 끊김 등
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// SlateCanvas 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Auth / Access
    // ─────────────────────────────────────────────────────────────────────────────
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Access(#[from] AccessError),

    // ─────────────────────────────────────────────────────────────────────────────
    // Account Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("email already registered")]
    EmailAlreadyRegistered,

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("invalid email address: {email}")]
    InvalidEmail { email: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Infrastructure Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// 저장소가 호출자가 처리하지 않은 unique 키 충돌을 보고한 경우
    #[error("store constraint violated: {key}")]
    StoreConstraint { key: String },

    #[error("password hashing failed: {message}")]
    PasswordHash { message: String },

    #[error("token key error: {message}")]
    TokenKey { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { key } => Error::StoreConstraint { key },
            StoreError::Unavailable { message } => Error::StoreUnavailable { message },
        }
    }
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Access(AccessError::InvalidPermission { .. })
            | Error::Access(AccessError::OwnerGrant)
            | Error::EmailAlreadyRegistered
            | Error::InvalidEmail { .. }
            | Error::Json(_) => 400,

            // 401 Unauthorized
            Error::Auth(_) | Error::InvalidCredentials => 401,

            // 403 Forbidden
            Error::Access(AccessError::PermissionDenied { .. }) => 403,

            // 404 Not Found
            Error::Access(AccessError::NotFound { .. })
            | Error::Access(AccessError::TargetNotFound { .. }) => 404,

            // 409 Conflict
            Error::Access(AccessError::Conflict { .. }) | Error::StoreConstraint { .. } => 409,

            // 503 Service Unavailable
            Error::StoreUnavailable { .. } => 503,

            // 500 Internal Server Error
            Error::PasswordHash { .. } | Error::TokenKey { .. } => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::Auth(AuthError::Unauthenticated { .. }) => "UNAUTHENTICATED",
            Error::Auth(AuthError::Expired) => "TOKEN_EXPIRED",
            Error::Auth(AuthError::Invalid { .. }) => "INVALID_TOKEN",
            Error::Auth(AuthError::UnknownPrincipal { .. }) => "UNKNOWN_PRINCIPAL",
            Error::Access(AccessError::PermissionDenied { .. }) => "PERMISSION_DENIED",
            Error::Access(AccessError::NotFound { .. }) => "NOT_FOUND",
            Error::Access(AccessError::TargetNotFound { .. }) => "TARGET_NOT_FOUND",
            Error::Access(AccessError::InvalidPermission { .. }) => "INVALID_PERMISSION",
            Error::Access(AccessError::Conflict { .. }) => "CONFLICT",
            Error::Access(AccessError::OwnerGrant) => "OWNER_GRANT",
            Error::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::InvalidEmail { .. } => "INVALID_EMAIL",
            Error::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            Error::StoreConstraint { .. } => "STORE_CONSTRAINT",
            Error::PasswordHash { .. } => "PASSWORD_HASH_ERROR",
            Error::TokenKey { .. } => "TOKEN_KEY_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
