//! API request/response models for generation and assets.

use crate::db::models::assets::AssetDBResponse;
use crate::types::{AssetId, ModelId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateRequest {
    #[serde(alias = "modelId")]
    #[schema(value_type = Uuid)]
    pub model_id: ModelId,
    pub prompt: String,
    /// Source image reference, required for image-to-video models
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    #[schema(value_type = Uuid)]
    pub id: AssetId,
    #[schema(value_type = Uuid)]
    pub user_id: UserId,
    #[schema(value_type = Uuid)]
    pub model_id: ModelId,
    pub prompt: String,
    pub result_url: String,
    /// The model's cost captured at generation time
    pub cost: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl From<AssetDBResponse> for AssetResponse {
    fn from(db: AssetDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            model_id: db.model_id,
            prompt: db.prompt,
            result_url: db.result_url,
            cost: db.cost,
            created_at: db.created_at,
            model_name: db.model_name,
            user_name: db.user_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub message: String,
    pub asset: AssetResponse,
}
