//! /slates 핸들러
//!
//! 권한 판단은 모두 `AccessControl`에 맡기고, 여기서는 요청 파싱과 응답 구성만 합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use slate_core::model::{Slate, SlatePatch};

use super::{authenticate, MessageResponse};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// POST /slates 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreateSlateRequest {
    pub name: String,

    /// 없으면 기본 색상
    #[serde(default)]
    pub preview_color: Option<String>,
}

/// POST /slates/{slate_id}/share 쿼리
#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    pub target_email: String,

    #[serde(default = "default_permission")]
    pub permission: String,
}

fn default_permission() -> String {
    "read".to_string()
}

/// POST /slates
pub async fn create_slate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateSlateRequest>,
) -> Result<Json<Slate>> {
    let user = authenticate(&state, &headers).await?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest {
            message: "slate name must not be empty".to_string(),
        });
    }

    let slate = state
        .access
        .create_slate(&user, name, request.preview_color)
        .await?;
    Ok(Json(slate))
}

/// GET /slates
pub async fn list_owned(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Slate>>> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(state.access.list_accessible(&user).await?.owned))
}

/// GET /slates/shared
pub async fn list_shared(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Slate>>> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(state.access.list_accessible(&user).await?.shared))
}

/// GET /slates/{slate_id}
pub async fn get_slate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slate_id): Path<String>,
) -> Result<Json<Slate>> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(state.access.get_slate(&user, &slate_id).await?))
}

/// PATCH /slates/{slate_id}
pub async fn update_slate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slate_id): Path<String>,
    Json(patch): Json<SlatePatch>,
) -> Result<Json<Slate>> {
    let user = authenticate(&state, &headers).await?;

    if matches!(patch.name.as_deref(), Some(name) if name.trim().is_empty()) {
        return Err(ApiError::BadRequest {
            message: "slate name must not be empty".to_string(),
        });
    }

    Ok(Json(
        state.access.update_slate(&user, &slate_id, &patch).await?,
    ))
}

/// DELETE /slates/{slate_id}
pub async fn delete_slate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slate_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let user = authenticate(&state, &headers).await?;

    let slate = state.access.load_slate(&slate_id).await?;
    state.access.delete_slate(&user, &slate).await?;

    Ok(Json(MessageResponse {
        message: "Slate deleted successfully".to_string(),
    }))
}

/// POST /slates/{slate_id}/share?target_email=...&permission=read|write
pub async fn share_slate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slate_id): Path<String>,
    Query(query): Query<ShareQuery>,
) -> Result<Json<MessageResponse>> {
    let user = authenticate(&state, &headers).await?;

    let slate = state.access.load_slate(&slate_id).await?;
    let grant = state
        .access
        .share(&user, &slate, query.target_email.trim(), &query.permission)
        .await?;

    Ok(Json(MessageResponse {
        message: format!(
            "Slate shared with {} with {} permission",
            query.target_email.trim(),
            grant.permission
        ),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handlers::auth::{signup, CredentialsRequest};
    use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
    use axum::response::IntoResponse;
    use slate_core::store::MemoryStore;
    use std::collections::HashMap;

    fn test_state() -> Arc<AppState> {
        let vars: HashMap<&str, &str> = [
            ("SLATE_TOKEN_KEYS", "k1:wubbalubbadubdubwubbalubbadubdub"),
            ("SLATE_ARGON2_T_COST", "1"),
            ("SLATE_ARGON2_M_COST_KIB", "8"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        Arc::new(AppState::with_store(&config, Arc::new(MemoryStore::new())).unwrap())
    }

    async fn bearer(state: &Arc<AppState>, email: &str) -> HeaderMap {
        let Json(token) = signup(
            State(state.clone()),
            Json(CredentialsRequest {
                email: email.to_string(),
                password: "pw".to_string(),
            }),
        )
        .await
        .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.access_token)).unwrap(),
        );
        headers
    }

    fn status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    async fn create(state: &Arc<AppState>, headers: &HeaderMap, name: &str) -> Slate {
        let Json(slate) = create_slate(
            State(state.clone()),
            headers.clone(),
            Json(CreateSlateRequest {
                name: name.to_string(),
                preview_color: None,
            }),
        )
        .await
        .unwrap();
        slate
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let state = test_state();
        let err = list_owned(State(state), HeaderMap::new()).await.unwrap_err();
        assert_eq!(status(err), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let state = test_state();
        let alice = bearer(&state, "alice@example.com").await;

        let err = create_slate(
            State(state),
            alice,
            Json(CreateSlateRequest {
                name: "   ".to_string(),
                preview_color: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_share_flow() {
        let state = test_state();
        let alice = bearer(&state, "alice@example.com").await;
        let bob = bearer(&state, "bob@example.com").await;

        let slate = create(&state, &alice, "Board A").await;
        assert_eq!(slate.preview_color, "#3b82f6");

        // 공유 전: bob은 조회 불가
        let err = get_slate(State(state.clone()), bob.clone(), Path(slate.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(status(err), StatusCode::FORBIDDEN);

        let Json(ack) = share_slate(
            State(state.clone()),
            alice.clone(),
            Path(slate.id.clone()),
            Query(ShareQuery {
                target_email: "bob@example.com".to_string(),
                permission: default_permission(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            ack.message,
            "Slate shared with bob@example.com with read permission"
        );

        let Json(shared) = list_shared(State(state.clone()), bob.clone()).await.unwrap();
        assert_eq!(shared.len(), 1);
        let Json(owned) = list_owned(State(state.clone()), bob.clone()).await.unwrap();
        assert!(owned.is_empty());

        // read 권한으로는 수정 불가
        let err = update_slate(
            State(state.clone()),
            bob.clone(),
            Path(slate.id.clone()),
            Json(SlatePatch {
                name: Some("Bob's Board".to_string()),
                preview_color: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status(err), StatusCode::FORBIDDEN);

        // 소유자 아닌 사용자의 삭제 거부
        let err = delete_slate(State(state.clone()), bob.clone(), Path(slate.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(status(err), StatusCode::FORBIDDEN);

        delete_slate(State(state.clone()), alice, Path(slate.id.clone()))
            .await
            .unwrap();
        let err = get_slate(State(state.clone()), bob.clone(), Path(slate.id))
            .await
            .unwrap_err();
        assert_eq!(status(err), StatusCode::NOT_FOUND);

        let Json(shared) = list_shared(State(state), bob).await.unwrap();
        assert!(shared.is_empty());
    }

    #[tokio::test]
    async fn test_share_rejects_unknown_permission() {
        let state = test_state();
        let alice = bearer(&state, "alice@example.com").await;
        bearer(&state, "bob@example.com").await;
        let slate = create(&state, &alice, "Board A").await;

        let err = share_slate(
            State(state),
            alice,
            Path(slate.id),
            Query(ShareQuery {
                target_email: "bob@example.com".to_string(),
                permission: "admin".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status(err), StatusCode::BAD_REQUEST);
    }
}
