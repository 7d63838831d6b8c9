use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::functions::{LivenessOutcome, Relay};
use crate::stats::{RelayStats, StatsSnapshot};
use crate::store::{DocPath, DocumentStore, MemoryStore, StoreError};

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub relay: Arc<Relay>,
    pub stats: Arc<RelayStats>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Serialize)]
pub struct CollectionResponse {
    pub collection: String,
    pub ids: Vec<String>,
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> Json<CollectionResponse> {
    let ids = state.store.list(&collection);
    Json(CollectionResponse { collection, ids })
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let path = DocPath::new(collection, id);
    state
        .store
        .get(&path)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Document '{}' not found", path)))
}

pub async fn put_document(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(doc): Json<serde_json::Value>,
) -> Result<StatusCode, ApiError> {
    state.store.set(&DocPath::new(collection, id), doc).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct AddResponse {
    pub id: String,
}

pub async fn add_document(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Json(doc): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<AddResponse>), ApiError> {
    let id = state.store.add(&collection, doc).await?;
    Ok((StatusCode::CREATED, Json(AddResponse { id })))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&DocPath::new(collection, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Liveness
// ============================================================================

/// Run a liveness check now, for external schedulers
pub async fn check_liveness(State(state): State<Arc<AppState>>) -> Json<LivenessOutcome> {
    let outcome = state.relay.check_liveness(chrono::Utc::now()).await;
    state.stats.record_liveness(&outcome);
    Json(outcome)
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Serialize)]
pub struct StatsResponse {
    pub documents: usize,
    #[serde(flatten)]
    pub relay: StatsSnapshot,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        documents: state.store.len(),
        relay: state.stats.snapshot(),
    })
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotAnObject(_) | StoreError::InvalidCollection(_) => {
                ApiError::BadRequest(e.to_string())
            }
            StoreError::Unavailable(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
