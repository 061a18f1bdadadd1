use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use bytes::Bytes;
use futures::{stream, StreamExt};
use notary_query::{QueryResponse, VerificationReport};
use notary_types::{BlobLocator, DocumentMetadata, Fingerprint};
use notary_upload::{TransportError, UploadChunk, UploadResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "notary-server",
        "version": env!("CARGO_PKG_VERSION"),
        "fingerprint_algorithm": state.algorithm().name(),
        "blob_root": state.store().root().display().to_string(),
    }))
}

/// Upload metadata, carried in the query string. Missing fields are empty and
/// fail validation downstream.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadParams {
    pub document_id: String,
    pub owner_id: String,
    pub file_name: String,
    pub file_type: String,
}

impl From<UploadParams> for DocumentMetadata {
    fn from(p: UploadParams) -> Self {
        DocumentMetadata::new(p.document_id, p.owner_id, p.file_name, p.file_type)
    }
}

/// `POST /v1/documents`: the body is the document, streamed frame by frame.
pub async fn upload_handler(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Body,
) -> Result<Json<UploadResponse>, ApiError> {
    let metadata = DocumentMetadata::from(params);
    debug!(document = %metadata.document_id, "upload request");

    let opening = stream::once(async move { Ok(UploadChunk::first(metadata, Bytes::new())) });
    let frames = body
        .into_data_stream()
        .map(|frame| frame.map(UploadChunk::data).map_err(|e| TransportError::new(e.to_string())));

    let response = state.coordinator.handle(opening.chain(frames)).await?;
    Ok(Json(response))
}

/// `GET /v1/documents/:id`
pub async fn query_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Json<QueryResponse> {
    Json(state.query.query(&document_id).await)
}

/// `GET /v1/documents/:id/verify`
pub async fn verify_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Json<VerificationReport> {
    Json(state.verifier.verify(&document_id).await)
}

/// Body of a re-commit request for a blob kept after a ledger failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommitRequest {
    pub owner_id: String,
    pub file_name: String,
    pub file_type: String,
    pub content_fingerprint: Fingerprint,
    pub blob_location: BlobLocator,
}

/// `POST /v1/documents/:id/commit`
pub async fn recommit_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(req): Json<RecommitRequest>,
) -> Json<UploadResponse> {
    let metadata = DocumentMetadata::new(document_id, req.owner_id, req.file_name, req.file_type);
    Json(
        state
            .coordinator
            .handle_recommit(&metadata, &req.content_fingerprint, &req.blob_location)
            .await,
    )
}
