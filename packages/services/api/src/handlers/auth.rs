//! /auth 핸들러

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use slate_core::auth::{IssuedToken, PasswordResetAck};

use crate::error::Result;
use crate::state::AppState;

/// 가입 / 로그인 요청 본문
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<IssuedToken>> {
    let token = state
        .accounts
        .signup(request.email.trim(), &request.password)
        .await?;
    Ok(Json(token))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<IssuedToken>> {
    let token = state
        .accounts
        .login(request.email.trim(), &request.password)
        .await?;
    Ok(Json(token))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<PasswordResetAck>> {
    Ok(Json(
        state.accounts.forgot_password(request.email.trim()).await?,
    ))
}
