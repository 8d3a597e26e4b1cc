//! slate-core: SlateCanvas 핵심 라이브러리
//!
//! Slate 소유권 / 공유 접근 제어와, 이를 위한 stateless 인증을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `auth`: 비밀번호 해시, Access Token 발급/검증, 호출자 확인, 계정
//! - `permissions`: Read / Write / Administer 정책과 접근 제어 엔진
//! - `store`: Resource Store 인터페이스와 메모리 구현
//! - `model`: User / Slate / ShareGrant 레코드
//! - `error`: 공통 에러 타입
//! - `id`: ID 생성

pub mod auth;
pub mod error;
pub mod id;
pub mod model;
pub mod permissions;
pub mod store;

pub use error::{AccessError, AuthError, Error, Result, StoreError};
