//! API request/response models for the model catalog.

use crate::db::models::catalog::{ModelCreateDBRequest, ModelDBResponse, ModelKind, ModelStatus, ModelUpdateDBRequest};
use crate::types::ModelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelResponse {
    #[schema(value_type = Uuid)]
    pub id: ModelId,
    pub name: String,
    pub kind: ModelKind,
    pub description: Option<String>,
    pub cost_per_generation: i64,
    pub status: ModelStatus,
    pub thumbnail_url: Option<String>,
    pub api_endpoint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ModelDBResponse> for ModelResponse {
    fn from(db: ModelDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            kind: db.kind,
            description: db.description,
            cost_per_generation: db.cost_per_generation,
            status: db.status,
            thumbnail_url: db.thumbnail_url,
            api_endpoint: db.api_endpoint,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelCreate {
    pub name: String,
    pub kind: ModelKind,
    pub description: Option<String>,
    pub cost_per_generation: i64,
    /// Defaults to `active` when omitted
    pub status: Option<ModelStatus>,
    pub thumbnail_url: Option<String>,
    pub api_endpoint: Option<String>,
}

impl From<ModelCreate> for ModelCreateDBRequest {
    fn from(api: ModelCreate) -> Self {
        Self {
            name: api.name,
            kind: api.kind,
            description: api.description,
            cost_per_generation: api.cost_per_generation,
            status: api.status.unwrap_or(ModelStatus::Active),
            thumbnail_url: api.thumbnail_url,
            api_endpoint: api.api_endpoint,
        }
    }
}

/// Partial update; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ModelUpdate {
    pub name: Option<String>,
    pub kind: Option<ModelKind>,
    pub description: Option<String>,
    pub cost_per_generation: Option<i64>,
    pub status: Option<ModelStatus>,
    pub thumbnail_url: Option<String>,
    pub api_endpoint: Option<String>,
}

impl From<ModelUpdate> for ModelUpdateDBRequest {
    fn from(api: ModelUpdate) -> Self {
        Self {
            name: api.name,
            kind: api.kind,
            description: api.description,
            cost_per_generation: api.cost_per_generation,
            status: api.status,
            thumbnail_url: api.thumbnail_url,
            api_endpoint: api.api_endpoint,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelMutationResponse {
    pub message: String,
    pub model: ModelResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelDeleteResponse {
    pub message: String,
}
