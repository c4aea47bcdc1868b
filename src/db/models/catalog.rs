//! Database models for the AI model catalog.

use crate::types::ModelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// What a model turns a prompt into. Stored as TEXT in the database.
///
/// Each variant maps to exactly one provider gateway operation; dispatch over
/// this enum is exhaustive so adding a variant forces the gateway to grow
/// with it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    TextToVideo,
    ImageToVideo,
    TextToImage,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelKind::TextToVideo => "text_to_video",
            ModelKind::ImageToVideo => "image_to_video",
            ModelKind::TextToImage => "text_to_image",
        };
        write!(f, "{s}")
    }
}

/// Catalog availability. Only `active` models are offered to non-admin callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Active,
    Maintenance,
}

/// Database request for creating a catalog model
#[derive(Debug, Clone)]
pub struct ModelCreateDBRequest {
    pub name: String,
    pub kind: ModelKind,
    pub description: Option<String>,
    pub cost_per_generation: i64,
    pub status: ModelStatus,
    pub thumbnail_url: Option<String>,
    pub api_endpoint: Option<String>,
}

/// Database request for updating a catalog model. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ModelUpdateDBRequest {
    pub name: Option<String>,
    pub kind: Option<ModelKind>,
    pub description: Option<String>,
    pub cost_per_generation: Option<i64>,
    pub status: Option<ModelStatus>,
    pub thumbnail_url: Option<String>,
    pub api_endpoint: Option<String>,
}

/// Database response for a catalog model
#[derive(Debug, Clone)]
pub struct ModelDBResponse {
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
