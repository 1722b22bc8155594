//! Case library endpoints for browsing and authoring scenarios.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use nursesim_core::PatientCase;
use nursesim_llm::audit::OracleAuditEntry;
use nursesim_llm::backend::Avatar;
use nursesim_store::CaseDraft;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ApiError;
use crate::state::{AppEvent, SharedState};

// === API Types ===

#[derive(Debug, Deserialize, Default)]
pub struct DeleteParams {
    pub confirm: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub avatar_url: String,
}

// === API Endpoints ===

/// GET /api/cases - List every case in the library
pub async fn list_cases(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.cases.list().await)
}

/// POST /api/cases - Validate and save an authored case
pub async fn save_case(
    State(state): State<SharedState>,
    Json(case): Json<PatientCase>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = CaseDraft::edit(case).save(&state.cases).await?;
    state.publish(AppEvent::CaseSaved {
        case_id: saved.id.clone(),
        title: saved.title.clone(),
    });
    Ok(Json(saved))
}

/// DELETE /api/cases/{id} - Remove a case; requires ?confirm=true
pub async fn delete_case(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    if params.confirm != Some(true) {
        return Err(ApiError::Conflict(
            "คุณแน่ใจหรือไม่ว่าต้องการลบสถานการณ์นี้? Repeat the request with confirm=true."
                .to_string(),
        ));
    }
    if state.cases.delete(&id).await? {
        tracing::info!(case = %id, "case deleted");
        state.publish(AppEvent::CaseDeleted { case_id: id });
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/cases/{id}/avatar - Patient portrait for the case profile
///
/// A stored avatarUrl wins. Otherwise the oracle paints one, degrading
/// to a placeholder URL when image generation is unavailable.
pub async fn case_avatar(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let case = state
        .cases
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no case {id}")))?;

    if let Some(url) = case.profile.avatar_url.clone() {
        return Ok(Json(AvatarResponse { avatar_url: url }));
    }

    let started = Instant::now();
    let avatar = state
        .oracle
        .portrait(&case.profile.portrait_description())
        .await
        .map_err(|e| ApiError::Oracle(e.to_string()))?;

    let avatar_url = match avatar {
        Avatar::Generated { bytes, mime_type, model } => {
            OracleAuditEntry::new(
                None,
                model,
                "portrait".to_string(),
                0,
                0,
                &bytes,
                started.elapsed().as_millis() as u64,
            )
            .record();
            format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
        }
        Avatar::Placeholder { url } => url,
    };
    Ok(Json(AvatarResponse { avatar_url }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use nursesim_llm::backend::{
        GenRequest, GenResponse, GenerativeBackend, OracleError, SpeechClip,
    };
    use nursesim_store::{CaseRepository, MemoryStore};
    use std::sync::Arc;

    struct NullBackend;

    #[async_trait]
    impl GenerativeBackend for NullBackend {
        async fn generate(&self, _req: GenRequest) -> Result<GenResponse, OracleError> {
            Err(OracleError::Unavailable("null".to_string()))
        }

        async fn speak(&self, _text: &str, _voice: Option<&str>) -> Result<SpeechClip, OracleError> {
            Err(OracleError::Unavailable("null".to_string()))
        }

        async fn portrait(&self, _description: &str) -> Result<Avatar, OracleError> {
            Ok(Avatar::Placeholder {
                url: "https://example.invalid/a.png".to_string(),
            })
        }

        fn model_id(&self) -> &str {
            "null"
        }
    }

    fn shared() -> SharedState {
        let repo = CaseRepository::open(Arc::new(MemoryStore::new())).unwrap();
        Arc::new(AppState::new(repo, Arc::new(NullBackend)))
    }

    #[tokio::test]
    async fn test_delete_refuses_without_confirm() {
        let state = shared();
        let before = state.cases.len().await;

        let result = delete_case(
            State(state.clone()),
            Path("case-001".to_string()),
            Query(DeleteParams { confirm: None }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Conflict(_))));
        assert_eq!(state.cases.len().await, before);
        assert!(state.cases.get("case-001").await.is_some());
    }

    #[tokio::test]
    async fn test_confirmed_delete_removes_case_and_is_idempotent() {
        let state = shared();

        let response = delete_case(
            State(state.clone()),
            Path("case-001".to_string()),
            Query(DeleteParams {
                confirm: Some(true),
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.cases.get("case-001").await.is_none());

        let response = delete_case(
            State(state),
            Path("case-001".to_string()),
            Query(DeleteParams {
                confirm: Some(true),
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
