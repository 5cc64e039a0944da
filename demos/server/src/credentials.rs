//! Credential endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use credibil_vc::{Credential, IssueRequest, PresentedCredential, Verification};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppJson, AppState};

// Issue a credential for the posted type and claims.
#[axum::debug_handler]
pub async fn issue(
    State(engine): State<AppState>, AppJson(request): AppJson<IssueRequest>,
) -> Result<(StatusCode, AppJson<Credential>), AppError> {
    let credential = engine.issue(request).await?;
    Ok((StatusCode::CREATED, AppJson(credential)))
}

#[axum::debug_handler]
pub async fn list(State(engine): State<AppState>) -> Result<AppJson<Vec<Credential>>, AppError> {
    Ok(AppJson(engine.list().await?))
}

#[axum::debug_handler]
pub async fn find(
    State(engine): State<AppState>, Path(id): Path<String>,
) -> Result<AppJson<Credential>, AppError> {
    let Some(credential) = engine.find(&id).await? else {
        return Err(AppError::Status(StatusCode::NOT_FOUND, "Credential not found".into()));
    };
    Ok(AppJson(credential))
}

/// Verification request body. `credential` is required and must be an
/// object.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    credential: PresentedCredential,
}

// Verify a presented credential. Rejections are reported in the body with a
// 200 status.
#[axum::debug_handler]
pub async fn verify(
    State(engine): State<AppState>, AppJson(request): AppJson<VerifyRequest>,
) -> AppJson<Verification> {
    AppJson(engine.verify(&request.credential).await)
}

/// Removal response body.
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    success: bool,
    message: String,
}

#[axum::debug_handler]
pub async fn remove(
    State(engine): State<AppState>, Path(id): Path<String>,
) -> Result<AppJson<RemoveResponse>, AppError> {
    let success = engine.remove(&id).await?;
    let message = if success { "Credential deleted" } else { "Credential not found" };
    Ok(AppJson(RemoveResponse {
        success,
        message: message.to_string(),
    }))
}
