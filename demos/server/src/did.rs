//! DID document endpoint.

use axum::extract::State;
use credibil_vc::Document;

use crate::{AppError, AppJson, AppState};

// Publish the service's DID document at its did:web location.
#[axum::debug_handler]
pub async fn document(State(engine): State<AppState>) -> Result<AppJson<Document>, AppError> {
    tracing::debug!("serving DID document for {}", engine.resolver().self_did());
    Ok(AppJson(engine.resolver().self_did_document()?))
}
