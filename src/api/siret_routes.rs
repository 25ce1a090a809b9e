//! SIRET REST API routes
//!
//! GET    /siret/:siret   fetch one establishment
//! DELETE /siret/:siret   delete one establishment
//! POST   /siret          insert (JSON body and/or query string)
//! PUT    /siret/:siret   partial update (JSON body and/or query string)
//! GET    /health         liveness and storage probe

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::action_log::{ActionLog, RequestVerb};
use crate::error::{SiretError, ValidationResult};
use crate::models::establishment::SIRET;
use crate::models::Establishment;
use crate::services::SiretService;
use crate::validation::FieldSet;

/// State for SIRET routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SiretService>,
    pub action_log: ActionLog,
}

impl AppState {
    pub fn new(service: Arc<SiretService>, action_log: ActionLog) -> Self {
        Self {
            service,
            action_log,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Query-string fields first, then JSON body fields on top.
fn request_fields(query: Vec<(String, String)>, body: &[u8]) -> ValidationResult<FieldSet> {
    let mut fields = FieldSet::from_query_pairs(query);
    if !body.iter().all(u8::is_ascii_whitespace) {
        fields.extend(FieldSet::from_json_slice(body)?);
    }
    Ok(fields)
}

pub async fn get_siret(
    State(state): State<AppState>,
    Path(siret): Path<String>,
) -> Result<Json<Establishment>, SiretError> {
    state.action_log.record(RequestVerb::Get, &siret);
    let record = state.service.get(&siret).await?;
    Ok(Json(record))
}

pub async fn delete_siret(
    State(state): State<AppState>,
    Path(siret): Path<String>,
) -> Result<Json<MessageResponse>, SiretError> {
    state.action_log.record(RequestVerb::Delete, &siret);
    state.service.delete(&siret).await?;
    Ok(Json(MessageResponse::new("SIRET deleted")))
}

pub async fn add_siret(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<MessageResponse>, SiretError> {
    let fields = request_fields(query, &body);
    let logged_id = fields
        .as_ref()
        .ok()
        .and_then(|fields| fields.value(SIRET))
        .unwrap_or_default();
    state.action_log.record(RequestVerb::Add, logged_id);

    state.service.create(&fields?).await?;
    Ok(Json(MessageResponse::new("SIRET added successfully")))
}

pub async fn update_siret(
    State(state): State<AppState>,
    Path(siret): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<MessageResponse>, SiretError> {
    state.action_log.record(RequestVerb::Update, &siret);
    let fields = request_fields(query, &body)?;
    state.service.update(&siret, fields).await?;
    Ok(Json(MessageResponse::new("SIRET updated")))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.service.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}
