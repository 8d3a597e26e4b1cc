//! HTTP 핸들러

pub mod auth;
pub mod health;
pub mod slates;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use slate_core::auth::bearer_token;
use slate_core::model::User;

use crate::error::Result;
use crate::state::AppState;

/// `Authorization: Bearer ...` 헤더로 현재 사용자 확인
pub(crate) async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    Ok(state.resolver.resolve(bearer_token(header)).await?)
}

/// 단순 메시지 응답
#[derive(Debug, serde::Serialize)]
pub struct MessageResponse {
    pub message: String,
}
