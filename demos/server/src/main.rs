//! # HTTP server example
//!
//! Exposes credential issuance and verification, and the service's
//! `did:web` document, over HTTP using the `credibil-vc` crate.
//!
//! Configuration is read from the environment: `BASE_URL` (the public
//! address the DID is derived from), `KEY_DIR` (where the key pair is
//! kept), `LISTEN_ADDR` (default `0.0.0.0:3000`) and `RUST_LOG`.

mod credentials;
mod did;

use std::sync::Arc;

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use credibil_vc::error::Err;
use credibil_vc::{Config, CredentialEngine, MemoryStore};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Shared application state.
pub type AppState = Arc<CredentialEngine<MemoryStore>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let engine = CredentialEngine::from_config(&config, MemoryStore::new())?;
    if !engine.keys().is_persistent() {
        tracing::warn!("key pair is not persisted; issued credentials will not verify after restart");
    }
    tracing::info!("serving {} for {}", engine.resolver().self_did(), config.base_url);

    let cors = CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any);
    let router = Router::new()
        .route("/.well-known/did.json", get(did::document))
        .route("/credentials", get(credentials::list))
        .route("/credentials/issue", post(credentials::issue))
        .route("/credentials/verify", post(credentials::verify))
        .route("/credentials/{id}", get(credentials::find).delete(credentials::remove))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(engine));

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).with_graceful_shutdown(shutdown()).await?;
    Ok(())
}

async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutting down");
}

/// JSON extractor and response that reports rejections as [`AppError`]s.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Application errors.
pub enum AppError {
    /// The request body was not valid JSON for the endpoint.
    InvalidJson(JsonRejection),

    /// Status code and message error.
    Status(StatusCode, String),

    /// Error raised by the credential engine.
    Engine(credibil_vc::Error),
}

/// Error response body.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::InvalidJson(rejection) => (rejection.status(), rejection.body_text()),
            Self::Status(status, error) => (status, error),
            Self::Engine(e) if e.is(Err::InvalidInput) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Engine(e) => {
                tracing::error!("internal server error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".into())
            }
        };
        (status, AppJson(ErrorResponse { error })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidJson(rejection)
    }
}

impl From<credibil_vc::Error> for AppError {
    fn from(error: credibil_vc::Error) -> Self {
        Self::Engine(error)
    }
}
