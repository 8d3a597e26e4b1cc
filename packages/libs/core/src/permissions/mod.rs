//! Slate 접근 제어
//!
//! # 모듈 구조
//!
//! - `policy`: Read / Write / Administer 능력 평가 (순수 함수)
//! - `engine`: 저장소를 조회하여 정책을 적용하는 `AccessControl`

mod engine;
mod policy;

pub use engine::{AccessControl, AccessibleSlates, MAX_SHARE_ATTEMPTS};
pub use policy::{can_administer, can_read, can_write, evaluate, Capability, Decision};
